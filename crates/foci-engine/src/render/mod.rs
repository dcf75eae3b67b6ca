//! Per-frame render context handed to applications.
//!
//! Drawing goes through [`crate::gfx`]; this module only describes the device
//! and the color target of the current frame.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
