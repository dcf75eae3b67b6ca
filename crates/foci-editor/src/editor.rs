use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use foci_engine::coords::Viewport;
use foci_engine::core::{App, AppControl, FrameCtx};
use foci_engine::device::GpuInit;
use foci_engine::gfx::WgpuBackend;
use foci_engine::input::{InputEvent, Key, KeyState};
use foci_engine::window::{Runtime, RuntimeConfig};

use crate::config::{EditorConfig, RenderConfig};
use crate::interaction::Interaction;
use crate::render::{plan_frame, ShapesRenderer};
use crate::scene::Scene;

/// Editor entry point.
///
/// ```rust,ignore
/// let mut scene = Scene::new();
/// let a = scene.add_circle(0.3, 0.2, 0.05);
/// let b = scene.add_circle(0.7, 0.5, 0.05);
/// scene.add_ellipse(a, b, 1.0)?;
///
/// Editor::new().title("foci").scene(scene).run()?;
/// ```
pub struct Editor {
    title: String,
    width: f64,
    height: f64,
    config: EditorConfig,
    scene: Scene,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            title: "foci".to_string(),
            width: 1024.0,
            height: 768.0,
            config: EditorConfig::default(),
            scene: Scene::new(),
        }
    }

    /// Base window title; zoom and object count are appended while running.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// Scene to start from.
    pub fn scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    /// Opens the window and runs until it is closed or Escape is pressed.
    pub fn run(self) -> Result<()> {
        let runtime_config = RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
        };
        let app = EditorApp::new(self);
        Runtime::run(runtime_config, GpuInit::default(), app)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-window editor state driven by the runtime.
struct EditorApp {
    base_title: String,
    scene: Scene,
    interaction: Interaction,
    render_config: RenderConfig,
    /// Created on the first frame, once a device exists.
    renderer: Option<ShapesRenderer<WgpuBackend>>,
    /// Zoom and object count the window title was last set for.
    titled: Option<(f32, usize)>,
}

impl EditorApp {
    fn new(editor: Editor) -> Self {
        let viewport = Viewport::new(editor.width as f32, editor.height as f32);
        Self {
            base_title: editor.title,
            scene: editor.scene,
            interaction: Interaction::new(editor.config.interaction, viewport),
            render_config: editor.config.render,
            renderer: None,
            titled: None,
        }
    }

    /// Feeds queued events to the interaction state machine. An Escape press
    /// ends the run; events after it are dropped.
    fn route_events(&mut self, events: &[InputEvent]) -> AppControl {
        for ev in events {
            if let InputEvent::Key { key: Key::Escape, state: KeyState::Pressed, .. } = ev {
                log::info!("escape pressed; closing");
                return AppControl::Exit;
            }
            self.interaction.handle_event(&mut self.scene, ev);
        }
        AppControl::Continue
    }

    /// New window title when zoom or object count changed since the last one.
    fn title_update(&mut self) -> Option<String> {
        let state = (self.interaction.zoom_factor(), self.scene.len());
        if self.titled == Some(state) {
            return None;
        }
        self.titled = Some(state);
        Some(format!("{} - zoom {:.1}x, {} objects", self.base_title, state.0, state.1))
    }
}

impl App for EditorApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        self.interaction.set_viewport(ctx.window.logical_size());

        if self.route_events(&ctx.input_frame.events) == AppControl::Exit {
            return Ok(AppControl::Exit);
        }

        if let Some(title) = self.title_update() {
            ctx.runtime.set_title(title);
        }

        let renderer = match self.renderer.take() {
            Some(r) => r,
            None => ShapesRenderer::new(ctx.gpu.gfx_backend()).context("failed to set up shape programs")?,
        };
        let renderer = self.renderer.insert(renderer);

        let plan = plan_frame(&self.scene, &self.interaction, &self.render_config);
        ctx.render(|_rctx, target| {
            renderer.draw(target, &plan).context("failed to draw shapes")
        })
    }
}
