use foci_engine::coords::{Mat3, Vec2, Viewport};

/// Camera over the scene: zoom plus viewport, and the affine maps between
/// world and device space they imply.
///
/// The world unit square `[0, 1]²` is centered in the viewport and fitted to
/// its shorter side at zoom 1, so shapes keep their aspect on any window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    zoom: f32,
    viewport: Viewport,
    proj: Mat3,
    unproj: Mat3,
}

impl View {
    pub fn new(zoom: f32, viewport: Viewport) -> Self {
        let proj = projection(zoom, viewport);
        let unproj = proj.inverse_scale_translate().unwrap_or_else(|| {
            log::warn!("projection for zoom {zoom} and {viewport:?} is singular; unprojecting with identity");
            Mat3::IDENTITY
        });
        Self { zoom, viewport, proj, unproj }
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// World to device.
    #[inline]
    pub fn proj(&self) -> Mat3 {
        self.proj
    }

    /// Logical pixel (origin top-left, +Y down) to device coordinates (+Y up).
    pub fn pixel_to_device(&self, pixel: Vec2) -> Vec2 {
        let Viewport { width, height } = self.viewport;
        if !self.viewport.is_valid() {
            return Vec2::zero();
        }
        Vec2::new(2.0 * pixel.x / width - 1.0, 1.0 - 2.0 * pixel.y / height)
    }

    #[inline]
    pub fn device_to_world(&self, device: Vec2) -> Vec2 {
        self.unproj.transform_point(device)
    }

    #[inline]
    pub fn world_to_device(&self, world: Vec2) -> Vec2 {
        self.proj.transform_point(world)
    }

    #[inline]
    pub fn pixel_to_world(&self, pixel: Vec2) -> Vec2 {
        self.device_to_world(self.pixel_to_device(pixel))
    }

    /// World-space corners of the visible area: bottom-left and top-right.
    pub fn visible_world_bounds(&self) -> [Vec2; 2] {
        [
            self.device_to_world(Vec2::new(-1.0, -1.0)),
            self.device_to_world(Vec2::new(1.0, 1.0)),
        ]
    }
}

fn projection(zoom: f32, viewport: Viewport) -> Mat3 {
    let (w, h) = if viewport.is_valid() {
        (viewport.width, viewport.height)
    } else {
        (1.0, 1.0)
    };
    let sx = 2.0 * zoom * (h / w).min(1.0);
    let sy = 2.0 * zoom * (w / h).min(1.0);
    Mat3::scale_translate(sx, sy, -sx / 2.0, -sy / 2.0)
}
