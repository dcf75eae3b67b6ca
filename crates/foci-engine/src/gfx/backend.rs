use crate::coords::ColorRgba;

use super::handle::VertexArrayHandle;

/// Pipeline stage a shader object compiles for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point attribute the WGSL source must carry.
    pub const fn wgsl_attribute(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "@vertex",
            ShaderStage::Fragment => "@fragment",
        }
    }
}

/// Layout of one vertex input fed from a buffer region.
///
/// `stride` is already resolved (never 0). Each attribute is fed from its own
/// buffer slot starting at `offset`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

impl VertexAttribute {
    /// Bytes read for a single vertex.
    #[inline]
    pub const fn element_size(&self) -> u32 {
        self.components * 4
    }
}

/// Linked stage pair handed to the backend to build a program object.
pub struct ProgramDesc<'a, B: GfxBackend + ?Sized> {
    pub vertex: &'a B::Module,
    pub vertex_entry: &'a str,
    pub fragment: &'a B::Module,
    pub fragment_entry: &'a str,
    /// Size of the merged uniform block; 0 when neither stage declares one.
    pub uniform_size: u32,
}

/// Vertex buffer bound for a draw.
pub struct VertexBinding<'a, B: GfxBackend + ?Sized> {
    pub attribute: VertexAttribute,
    pub buffer: &'a B::Buffer,
}

/// A validated draw submission.
pub struct DrawCall<'a, B: GfxBackend + ?Sized> {
    pub program_name: &'a str,
    pub program: &'a mut B::Program,
    /// Host copy of the program's uniform block.
    pub uniforms: &'a [u8],
    pub vertex_array: VertexArrayHandle,
    /// Bumped whenever the vertex array's attribute layout changes.
    pub layout_revision: u64,
    pub bindings: Vec<VertexBinding<'a, B>>,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Graphics API the resource layer drives.
///
/// Every method executes immediately, in call order. Validation of handles and
/// arguments happens in [`Gfx`](super::Gfx) before the backend is reached.
pub trait GfxBackend {
    type Buffer;
    type Module;
    type Program;
    type Target<'t>;

    fn create_buffer(&mut self, label: &str) -> Self::Buffer;

    /// Replaces the full contents of `buffer`.
    fn upload_buffer(&mut self, buffer: &mut Self::Buffer, bytes: &[u8]);

    /// Called once the source has passed validation.
    fn create_module(&mut self, name: &str, stage: ShaderStage, source: &str) -> Self::Module;

    fn create_program(&mut self, name: &str, desc: ProgramDesc<'_, Self>) -> Self::Program;

    fn clear(&mut self, target: &Self::Target<'_>, color: ColorRgba);

    fn draw(&mut self, target: &Self::Target<'_>, call: DrawCall<'_, Self>);
}
