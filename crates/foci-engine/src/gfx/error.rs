use std::fmt;
use std::panic::Location;

/// What went wrong inside the GPU resource layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxErrorKind {
    /// Shader source failed to parse or validate. `log` is the compiler output.
    ShaderCompile { shader: String, log: String },
    /// Program could not be linked from its attached shaders.
    ProgramLink { program: String, log: String },
    /// The call was rejected before reaching the backend (the GL analogue of
    /// `GL_INVALID_OPERATION` / `GL_INVALID_VALUE`).
    InvalidOperation(String),
}

/// Error returned by [`Gfx`](super::Gfx) operations.
///
/// These indicate setup or programming defects, not runtime conditions; callers
/// propagate them to the top of the process and exit. The caller's source
/// location is recorded for the diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxError {
    pub kind: GfxErrorKind,
    pub location: &'static Location<'static>,
}

impl GfxError {
    #[track_caller]
    pub(crate) fn new(kind: GfxErrorKind) -> Self {
        Self { kind, location: Location::caller() }
    }

    #[track_caller]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::new(GfxErrorKind::InvalidOperation(msg.into()))
    }
}

impl fmt::Display for GfxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxErrorKind::ShaderCompile { shader, log } => {
                write!(f, "shader {shader} failed to compile: {log}")
            }
            GfxErrorKind::ProgramLink { program, log } => {
                write!(f, "failed to link shader program {program}: {log}")
            }
            GfxErrorKind::InvalidOperation(msg) => write!(f, "invalid gfx operation: {msg}"),
        }
    }
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in {} line {}: {}",
            self.location.file(),
            self.location.line(),
            self.kind
        )
    }
}

impl std::error::Error for GfxError {}
