//! Coordinate and geometry types shared by the engine and the editor.
//!
//! Three spaces are in play:
//! - pixel: logical pixels, origin top-left, +Y down (cursor events, viewport)
//! - device: normalized device coordinates in `[-1, 1]`, +Y up
//! - world: editor scene space, +Y up
//!
//! `Mat3` carries the affine maps between device and world space.

mod color;
mod mat3;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use mat3::Mat3;
pub use vec2::Vec2;
pub use viewport::Viewport;
