use core::fmt;

use super::uniform::UniformType;

macro_rules! arena_handle {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect(concat!($label, " arena exceeded u32::MAX entries")))
            }

            /// Position of the tracking record in its arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

arena_handle!(
    /// Vertex data buffer.
    BufferHandle,
    "buffer"
);
arena_handle!(
    /// Attribute layout: which buffer regions feed which vertex inputs.
    VertexArrayHandle,
    "vertex-array"
);
arena_handle!(
    /// Single-stage shader object.
    ShaderHandle,
    "shader"
);
arena_handle!(
    /// Vertex + fragment shader pair linked into one program.
    ProgramHandle,
    "program"
);

/// Location of a uniform inside a linked program's uniform block.
///
/// A location returned for an unknown name is a sentinel: setting it is a
/// no-op, mirroring how GL treats location `-1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub(crate) program: ProgramHandle,
    pub(crate) slot: Option<UniformSlot>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct UniformSlot {
    pub offset: u32,
    pub ty: UniformType,
}

impl UniformLocation {
    #[inline]
    pub(crate) fn not_found(program: ProgramHandle) -> Self {
        Self { program, slot: None }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.slot.is_some()
    }

    /// Byte offset inside the uniform block, if found.
    #[inline]
    pub fn offset(&self) -> Option<u32> {
        self.slot.map(|s| s.offset)
    }
}

/// Vertex input location (`@location(n)`), or the "not found" sentinel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLocation(pub(crate) Option<u32>);

impl AttributeLocation {
    pub const NOT_FOUND: AttributeLocation = AttributeLocation(None);

    #[inline]
    pub fn is_found(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn get(&self) -> Option<u32> {
        self.0
    }
}
