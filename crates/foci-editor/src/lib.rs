//! Interactive editor for circles and two-focus ellipses.
//!
//! Circles are control points; an ellipse is the region whose summed distance
//! to two circles' centers stays below its radius. Objects are hovered and
//! dragged with the left mouse button, circles are added with the right
//! button, `E` joins the two newest circles with an ellipse and the wheel
//! zooms.

pub mod config;
pub mod editor;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod view;

pub use config::{EditorConfig, InteractionConfig, RenderConfig};
pub use editor::Editor;
pub use interaction::{Interaction, InteractionMode};
pub use scene::{Circle, Ellipse, Object, ObjectId, ObjectKind, Scene, SceneError};
pub use view::View;
