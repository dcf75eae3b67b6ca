//! GPU resource layer.
//!
//! A small GL-flavoured object model over a pluggable backend:
//! buffers, vertex arrays, single-stage shaders and linked programs are created
//! into append-only arenas and addressed by index handles. Shaders are WGSL;
//! compilation validates and reflects them with `naga` so that link errors,
//! uniform offsets and attribute locations are known on the CPU.
//!
//! Submission is immediate. `clear` and `draw` reach the backend in call order
//! with the uniform and buffer contents current at the time of the call.
//!
//! Backends:
//! - [`WgpuBackend`]: live device
//! - [`HeadlessBackend`]: records commands, used by tests

mod backend;
mod error;
mod handle;
mod headless;
mod reflect;
mod registry;
mod uniform;
mod wgpu_backend;

pub use backend::{DrawCall, GfxBackend, ProgramDesc, ShaderStage, VertexAttribute, VertexBinding};
pub use error::{GfxError, GfxErrorKind};
pub use handle::{
    AttributeLocation, BufferHandle, ProgramHandle, ShaderHandle, UniformLocation,
    VertexArrayHandle,
};
pub use headless::{
    HeadlessBackend, HeadlessCommand, HeadlessModule, HeadlessProgram, HeadlessTarget,
    RecordedAttribute, RecordedDraw,
};
pub use registry::Gfx;
pub use uniform::{UniformType, UniformValue};
pub use wgpu_backend::{WgpuBackend, WgpuBuffer, WgpuModule, WgpuProgram};
