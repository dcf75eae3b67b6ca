use foci_engine::coords::ColorRgba;

/// Editor configuration.
#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
}

/// Tunables of the interaction state machine.
#[derive(Debug, Clone)]
pub struct InteractionConfig {
    /// Zoom change per scroll notch or `+`/`-` press.
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Radius of circles created with the right mouse button, in world units.
    pub new_circle_radius: f32,
    /// Added to the focal distance when an ellipse is created from two circles.
    pub new_ellipse_slack: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.5,
            min_zoom: 1.0,
            max_zoom: 5.0,
            new_circle_radius: 0.025,
            new_ellipse_slack: 0.25,
        }
    }
}

/// Renderer options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub clear_color: ColorRgba,
    /// Shade circles with a fixed directional light instead of flat color.
    pub lit_circles: bool,
    /// Half-extent of a circle's quad as a multiple of its radius. Must be at
    /// least 1 so the disc and its anti-aliased rim fit.
    pub circle_quad_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::rgb(0.1, 0.1, 0.1),
            lit_circles: false,
            circle_quad_scale: 2.0,
        }
    }
}
