//! Foci engine crate.
//!
//! Platform + GPU runtime used by the editor: window and event loop, wgpu
//! device management, input translation, logging setup, shared coordinate
//! types and the GPU resource layer ([`gfx`]).

pub mod core;
pub mod device;
pub mod input;
pub mod window;

pub mod coords;
pub mod gfx;
pub mod logging;
pub mod render;
