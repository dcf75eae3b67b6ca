//! GPU device + surface management.
//!
//! Creates the wgpu adapter/device/queue for a window, configures the surface
//! and hands out one frame (surface texture + view) at a time.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
