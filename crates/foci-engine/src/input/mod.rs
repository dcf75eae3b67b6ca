//! Input subsystem.
//!
//! The public API does not expose winit types. [`platform`] translates window
//! system events into [`InputEvent`]s.

mod frame;
pub mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent, ScrollDirection,
};
