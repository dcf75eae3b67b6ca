use crate::coords::Viewport;

/// Device handles and surface facts for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Window size in logical pixels.
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self { device, queue, surface_format, viewport }
    }
}

/// Color attachment the frame renders into.
///
/// Commands are submitted as they are issued, so the target carries no
/// encoder.
#[derive(Copy, Clone)]
pub struct RenderTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(view: &'a wgpu::TextureView, format: wgpu::TextureFormat) -> Self {
        Self { view, format }
    }
}
