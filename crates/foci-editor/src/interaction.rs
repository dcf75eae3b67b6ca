//! Interaction state machine.
//!
//! ```text
//! NORMAL   --move over object-->  HOVERING
//! HOVERING --move off objects-->  NORMAL
//! HOVERING --left press-------->  DRAGGING   (anchor captured)
//! DRAGGING --move-------------->  DRAGGING   (anchor + cursor delta)
//! DRAGGING --left release------>  NORMAL
//! DRAGGING --focus lost-------->  NORMAL
//! ```
//!
//! Zoom and object creation are orthogonal to the mode.

use foci_engine::coords::{Vec2, Viewport};
use foci_engine::input::{
    InputEvent, Key, KeyState, MouseButton, MouseButtonState, PointerButtonEvent, ScrollDirection,
};

use crate::config::InteractionConfig;
use crate::scene::{Object, ObjectId, Scene};
use crate::view::View;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum InteractionMode {
    #[default]
    Normal,
    Hovering,
    Dragging,
}

/// Snapshot taken when a drag starts. Every drag update is computed from it
/// rather than from the previous frame.
///
/// The cursor is kept in device space and unprojected with the current view,
/// so zooming mid-drag leaves the object under a still pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
struct DragAnchor {
    cursor_device: Vec2,
    target: AnchorTarget,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum AnchorTarget {
    Circle { center: Vec2 },
    Ellipse { radius: f32 },
}

/// Hover, drag and zoom state of the editor.
#[derive(Debug, Clone)]
pub struct Interaction {
    config: InteractionConfig,
    mode: InteractionMode,
    active: Option<ObjectId>,
    anchor: Option<DragAnchor>,
    view: View,
    /// Last pointer position in logical pixels.
    cursor: Option<Vec2>,
}

impl Interaction {
    pub fn new(config: InteractionConfig, viewport: Viewport) -> Self {
        let view = View::new(config.min_zoom, viewport);
        Self {
            config,
            mode: InteractionMode::Normal,
            active: None,
            anchor: None,
            view,
            cursor: None,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_hovering_object(&self) -> bool {
        self.mode == InteractionMode::Hovering
    }

    pub fn is_dragging_object(&self) -> bool {
        self.mode == InteractionMode::Dragging
    }

    /// Object under the pointer or being dragged.
    pub fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    /// Mode as seen by one object: the current mode for the active object,
    /// `Normal` for all others.
    pub fn mode_of(&self, id: ObjectId) -> InteractionMode {
        if self.active == Some(id) { self.mode } else { InteractionMode::Normal }
    }

    pub fn zoom_factor(&self) -> f32 {
        self.view.zoom()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Pointer position in logical pixels, `None` until it enters the window
    /// or after it leaves.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.view.viewport() {
            self.view = View::new(self.view.zoom(), viewport);
        }
    }

    pub fn handle_events<'e>(&mut self, scene: &mut Scene, events: impl IntoIterator<Item = &'e InputEvent>) {
        for ev in events {
            self.handle_event(scene, ev);
        }
    }

    /// Applies one input event. Events with no meaning here are ignored.
    pub fn handle_event(&mut self, scene: &mut Scene, ev: &InputEvent) {
        match ev {
            InputEvent::Resized { width, height } => self.set_viewport(Viewport::new(*width, *height)),

            InputEvent::PointerMoved(m) => self.pointer_moved(scene, Vec2::new(m.x, m.y)),

            InputEvent::PointerButton(b) => self.pointer_button(scene, b),

            InputEvent::MouseWheel { delta, .. } => match delta.vertical_direction() {
                Some(ScrollDirection::Up) => self.zoom_by(self.config.zoom_step),
                Some(ScrollDirection::Down) => self.zoom_by(-self.config.zoom_step),
                None => {}
            },

            InputEvent::Key { key, state: KeyState::Pressed, repeat, .. } => self.key_pressed(scene, *key, *repeat),

            InputEvent::PointerLeft => {
                self.cursor = None;
                if self.mode == InteractionMode::Hovering {
                    self.set_mode(InteractionMode::Normal, None);
                }
            }

            InputEvent::Focused(false) => {
                if self.mode == InteractionMode::Dragging {
                    log::info!("focus lost while dragging {:?}; drag cancelled", self.active);
                    self.anchor = None;
                    self.set_mode(InteractionMode::Normal, None);
                }
            }

            _ => {}
        }
    }

    fn pointer_moved(&mut self, scene: &mut Scene, pixel: Vec2) {
        self.cursor = Some(pixel);

        if self.mode == InteractionMode::Dragging {
            self.drag_to(scene, pixel);
            return;
        }

        let world = self.view.pixel_to_world(pixel);
        match scene.pick(world) {
            Some(id) => self.set_mode(InteractionMode::Hovering, Some(id)),
            None => self.set_mode(InteractionMode::Normal, None),
        }
    }

    fn pointer_button(&mut self, scene: &mut Scene, ev: &PointerButtonEvent) {
        let pixel = Vec2::new(ev.x, ev.y);

        match (ev.button, ev.state) {
            (MouseButton::Left, MouseButtonState::Pressed) => {
                if self.mode != InteractionMode::Hovering {
                    return;
                }
                let Some(id) = self.active else { return };
                let Some(object) = scene.get(id) else { return };

                let target = match object {
                    Object::Circle(c) => AnchorTarget::Circle { center: c.center },
                    Object::Ellipse(e) => AnchorTarget::Ellipse { radius: e.radius },
                };
                self.anchor = Some(DragAnchor { cursor_device: self.view.pixel_to_device(pixel), target });
                self.set_mode(InteractionMode::Dragging, Some(id));
            }

            (MouseButton::Left, MouseButtonState::Released) => {
                if self.mode == InteractionMode::Dragging {
                    self.anchor = None;
                    self.set_mode(InteractionMode::Normal, None);
                }
            }

            (MouseButton::Right, MouseButtonState::Pressed) => {
                if self.mode == InteractionMode::Dragging {
                    return;
                }
                let world = self.view.pixel_to_world(pixel);
                if scene.pick(world).is_none() {
                    scene.add_circle(world.x, world.y, self.config.new_circle_radius);
                }
            }

            _ => {}
        }
    }

    fn drag_to(&mut self, scene: &mut Scene, pixel: Vec2) {
        let (Some(id), Some(anchor)) = (self.active, self.anchor) else { return };
        let device = self.view.pixel_to_device(pixel);

        match anchor.target {
            AnchorTarget::Circle { center } => {
                let delta = self.view.device_to_world(device) - self.view.device_to_world(anchor.cursor_device);
                if let Some(circle) = scene.circle_mut(id) {
                    circle.center = center + delta;
                }
            }
            AnchorTarget::Ellipse { radius } => {
                // Foci stay put; only the radius follows the horizontal motion.
                let dx = device.x - anchor.cursor_device.x;
                if let Some(ellipse) = scene.ellipse_mut(id) {
                    ellipse.radius = (radius + dx).max(0.0);
                }
            }
        }
    }

    fn key_pressed(&mut self, scene: &mut Scene, key: Key, repeat: bool) {
        match key {
            Key::Character('+' | '=') => self.zoom_by(self.config.zoom_step),
            Key::Character('-') => self.zoom_by(-self.config.zoom_step),
            Key::Character('e') if !repeat => self.add_ellipse_from_recent(scene),
            _ => {}
        }
    }

    fn add_ellipse_from_recent(&mut self, scene: &mut Scene) {
        let Some([a, b]) = scene.last_two_circles() else {
            log::debug!("an ellipse needs two circles");
            return;
        };
        let (Some(ca), Some(cb)) = (scene.circle(a), scene.circle(b)) else { return };
        let radius = ca.center.distance(cb.center) + self.config.new_ellipse_slack;

        if let Err(err) = scene.add_ellipse(a, b, radius) {
            log::warn!("could not add ellipse: {err}");
        }
    }

    fn zoom_by(&mut self, step: f32) {
        let zoom = (self.view.zoom() + step).clamp(self.config.min_zoom, self.config.max_zoom);
        if zoom != self.view.zoom() {
            log::debug!("zoom {} -> {zoom}", self.view.zoom());
            self.view = View::new(zoom, self.view.viewport());
        }
    }

    fn set_mode(&mut self, mode: InteractionMode, active: Option<ObjectId>) {
        if mode != self.mode || active != self.active {
            log::debug!("{:?} {:?} -> {:?} {:?}", self.mode, self.active, mode, active);
        }
        self.mode = mode;
        self.active = active;
    }
}

#[cfg(test)]
mod tests {
    use foci_engine::input::{Modifiers, MouseWheelDelta, PointerMoveEvent};

    use super::*;

    // A square viewport at zoom 1 maps pixel (x, y) to world (x / 100, 1 - y / 100).
    const SIDE: f32 = 100.0;

    fn interaction() -> Interaction {
        Interaction::new(InteractionConfig::default(), Viewport::new(SIDE, SIDE))
    }

    fn seeded_scene() -> (Scene, ObjectId, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let c0 = scene.add_circle(0.3, 0.2, 0.05);
        let c1 = scene.add_circle(0.7, 0.5, 0.05);
        let e = scene.add_ellipse(c0, c1, 1.0).unwrap();
        (scene, c0, c1, e)
    }

    fn pixel(world_x: f32, world_y: f32) -> (f32, f32) {
        (world_x * SIDE, (1.0 - world_y) * SIDE)
    }

    fn move_to(world_x: f32, world_y: f32) -> InputEvent {
        let (x, y) = pixel(world_x, world_y);
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    fn button(button: MouseButton, state: MouseButtonState, world_x: f32, world_y: f32) -> InputEvent {
        let (x, y) = pixel(world_x, world_y);
        InputEvent::PointerButton(PointerButtonEvent { button, state, x, y, modifiers: Modifiers::default() })
    }

    fn scroll(y: f32) -> InputEvent {
        InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y }, modifiers: Modifiers::default() }
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key {
            key: Key::Character(c),
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn zoom_starts_at_one_and_clamps() {
        let mut scene = Scene::new();
        let mut it = interaction();
        assert_eq!(it.zoom_factor(), 1.0);

        for _ in 0..20 {
            it.handle_event(&mut scene, &scroll(1.0));
        }
        assert_eq!(it.zoom_factor(), 5.0);

        it.handle_event(&mut scene, &scroll(-1.0));
        assert_eq!(it.zoom_factor(), 4.5);

        for _ in 0..20 {
            it.handle_event(&mut scene, &scroll(-1.0));
        }
        assert_eq!(it.zoom_factor(), 1.0);
    }

    #[test]
    fn plus_and_minus_keys_zoom() {
        let mut scene = Scene::new();
        let mut it = interaction();
        it.handle_events(&mut scene, &[key('+'), key('+'), key('-')]);
        assert_eq!(it.zoom_factor(), 1.5);
        assert_eq!(it.view().zoom(), 1.5);
    }

    #[test]
    fn horizontal_scroll_is_ignored() {
        let mut scene = Scene::new();
        let mut it = interaction();
        let ev = InputEvent::MouseWheel {
            delta: MouseWheelDelta::Pixel { x: 4.0, y: 0.0 },
            modifiers: Modifiers::default(),
        };
        it.handle_event(&mut scene, &ev);
        assert_eq!(it.zoom_factor(), 1.0);
    }

    // ── hover ─────────────────────────────────────────────────────────────

    #[test]
    fn moving_over_object_hovers_it() {
        let (mut scene, c0, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &move_to(0.31, 0.2));
        assert!(it.is_hovering_object());
        assert_eq!(it.active_object(), Some(c0));
        assert_eq!(it.mode_of(c0), InteractionMode::Hovering);
    }

    #[test]
    fn moving_off_every_object_clears_hover() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &move_to(0.31, 0.2));
        it.handle_event(&mut scene, &move_to(0.95, 0.95));
        assert!(!it.is_hovering_object());
        assert_eq!(it.active_object(), None);
        assert_eq!(it.mode(), InteractionMode::Normal);
    }

    #[test]
    fn pointer_leaving_clears_hover() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_events(&mut scene, &[move_to(0.31, 0.2), InputEvent::PointerLeft]);
        assert_eq!(it.cursor(), None);
        assert_eq!(it.mode(), InteractionMode::Normal);
        assert_eq!(it.active_object(), None);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn circle_drag_applies_world_delta_from_anchor() {
        let (mut scene, c0, _, _) = seeded_scene();
        let mut it = interaction();

        it.handle_event(&mut scene, &move_to(0.31, 0.2));
        it.handle_event(&mut scene, &button(MouseButton::Left, MouseButtonState::Pressed, 0.31, 0.2));
        assert!(it.is_dragging_object());

        it.handle_event(&mut scene, &move_to(0.41, 0.2));
        let center = scene.circle(c0).unwrap().center;
        // Anchor center 0.30 plus cursor delta 0.10.
        assert!(approx(center.x, 0.40) && approx(center.y, 0.2), "{center:?}");

        // Relative to the anchor, not the previous move.
        it.handle_event(&mut scene, &move_to(0.41, 0.2));
        let center = scene.circle(c0).unwrap().center;
        assert!(approx(center.x, 0.40), "{center:?}");
    }

    #[test]
    fn circle_drag_delta_shrinks_with_zoom() {
        let (mut scene, c0, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_events(&mut scene, &[key('+'), key('+')]);
        assert_eq!(it.zoom_factor(), 2.0);

        let start = it.view().world_to_device(Vec2::new(0.3, 0.2));
        let start_px = Vec2::new((start.x + 1.0) * SIDE / 2.0, (1.0 - start.y) * SIDE / 2.0);
        let moved_px = start_px + Vec2::new(10.0, 0.0);
        let mv = |p: Vec2| InputEvent::PointerMoved(PointerMoveEvent { x: p.x, y: p.y });

        it.handle_event(&mut scene, &mv(start_px));
        it.handle_event(
            &mut scene,
            &InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: start_px.x,
                y: start_px.y,
                modifiers: Modifiers::default(),
            }),
        );
        it.handle_event(&mut scene, &mv(moved_px));

        // 10 px is 0.1 world units at zoom 1, half that at zoom 2.
        let center = scene.circle(c0).unwrap().center;
        assert!(approx(center.x, 0.35) && approx(center.y, 0.2), "{center:?}");
    }

    #[test]
    fn zoom_during_drag_keeps_circle_under_still_pointer() {
        let (mut scene, c0, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_events(
            &mut scene,
            &[
                move_to(0.31, 0.2),
                button(MouseButton::Left, MouseButtonState::Pressed, 0.31, 0.2),
                scroll(1.0),
            ],
        );
        assert_eq!(it.zoom_factor(), 1.5);
        assert!(it.is_dragging_object());

        // Same pixel as the press: no motion.
        it.handle_event(&mut scene, &move_to(0.31, 0.2));
        let center = scene.circle(c0).unwrap().center;
        assert!(approx(center.x, 0.3) && approx(center.y, 0.2), "{center:?}");

        // 10 px right is 0.2 device units, 0.2 / 3 world units at zoom 1.5.
        it.handle_event(&mut scene, &move_to(0.41, 0.2));
        let center = scene.circle(c0).unwrap().center;
        assert!(approx(center.x, 0.3 + 0.2 / 3.0) && approx(center.y, 0.2), "{center:?}");
    }

    #[test]
    fn ellipse_drag_changes_radius_only() {
        let (mut scene, c0, c1, e) = seeded_scene();
        let mut it = interaction();

        it.handle_event(&mut scene, &move_to(0.5, 0.35));
        assert_eq!(it.active_object(), Some(e));
        it.handle_event(&mut scene, &button(MouseButton::Left, MouseButtonState::Pressed, 0.5, 0.35));
        it.handle_event(&mut scene, &move_to(0.6, 0.9));

        // 0.1 world units is 0.2 device units at zoom 1 on a square viewport.
        assert!(approx(scene.ellipse(e).unwrap().radius, 1.2));
        assert_eq!(scene.circle(c0).unwrap().center, Vec2::new(0.3, 0.2));
        assert_eq!(scene.circle(c1).unwrap().center, Vec2::new(0.7, 0.5));
    }

    #[test]
    fn ellipse_radius_does_not_go_negative() {
        let (mut scene, _, _, e) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &move_to(0.5, 0.35));
        it.handle_event(&mut scene, &button(MouseButton::Left, MouseButtonState::Pressed, 0.5, 0.35));
        it.handle_event(&mut scene, &move_to(-5.0, 0.35));
        assert_eq!(scene.ellipse(e).unwrap().radius, 0.0);
    }

    #[test]
    fn release_always_returns_to_normal() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_events(
            &mut scene,
            &[
                move_to(0.31, 0.2),
                button(MouseButton::Left, MouseButtonState::Pressed, 0.31, 0.2),
                move_to(0.7, 0.5),
                button(MouseButton::Left, MouseButtonState::Released, 0.7, 0.5),
            ],
        );
        assert_eq!(it.mode(), InteractionMode::Normal);
        assert_eq!(it.active_object(), None);
    }

    #[test]
    fn press_without_hover_does_not_drag() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &button(MouseButton::Left, MouseButtonState::Pressed, 0.31, 0.2));
        assert!(!it.is_dragging_object());
    }

    #[test]
    fn focus_loss_cancels_drag() {
        let (mut scene, c0, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_events(
            &mut scene,
            &[
                move_to(0.31, 0.2),
                button(MouseButton::Left, MouseButtonState::Pressed, 0.31, 0.2),
                move_to(0.41, 0.2),
                InputEvent::Focused(false),
            ],
        );
        assert_eq!(it.mode(), InteractionMode::Normal);

        // Object keeps where the drag left it and later moves hover instead.
        let center = scene.circle(c0).unwrap().center;
        it.handle_event(&mut scene, &move_to(0.9, 0.9));
        assert_eq!(scene.circle(c0).unwrap().center, center);
    }

    // ── creation ──────────────────────────────────────────────────────────

    #[test]
    fn right_click_on_empty_space_adds_circle() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &button(MouseButton::Right, MouseButtonState::Pressed, 0.9, 0.9));
        assert_eq!(scene.len(), 4);
        let (_, circle) = scene.circles().last().unwrap();
        assert!(approx(circle.center.x, 0.9) && approx(circle.center.y, 0.9));
        assert_eq!(circle.radius, InteractionConfig::default().new_circle_radius);
    }

    #[test]
    fn right_click_on_object_adds_nothing() {
        let (mut scene, _, _, _) = seeded_scene();
        let mut it = interaction();
        it.handle_event(&mut scene, &button(MouseButton::Right, MouseButtonState::Pressed, 0.5, 0.35));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn e_key_joins_last_two_circles() {
        let mut scene = Scene::new();
        let mut it = interaction();
        it.handle_event(&mut scene, &key('e'));
        assert!(scene.is_empty());

        let a = scene.add_circle(0.2, 0.5, 0.02);
        let b = scene.add_circle(0.6, 0.5, 0.02);
        it.handle_event(&mut scene, &key('e'));

        let (_, ellipse) = scene.ellipses().next().unwrap();
        assert_eq!(ellipse.foci, [a, b]);
        assert!(approx(ellipse.radius, 0.4 + 0.25));
    }

    #[test]
    fn resize_updates_view() {
        let mut scene = Scene::new();
        let mut it = interaction();
        it.handle_event(&mut scene, &InputEvent::Resized { width: 400.0, height: 200.0 });
        assert_eq!(it.view().viewport(), Viewport::new(400.0, 200.0));
    }
}
