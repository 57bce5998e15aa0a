use winit::window::Window;

use crate::coords::Viewport;
use crate::scene::{Camera, Scene};

/// What an overlay may read and change while building a frame.
pub struct OverlayFrame<'a> {
    pub camera: &'a mut Camera,
    pub scene: &'a mut Scene,
    /// Drawable viewport in physical pixels.
    pub viewport: Viewport,
}

/// Screen-space overlay drawn after the scene, in the same frame.
///
/// Called in order once per frame: `build` before recording starts, then
/// `prepare` and `paint` while the renderer records the overlay pass.
pub trait OverlayPainter {
    /// Runs the UI for this frame and keeps the resulting geometry.
    fn build(&mut self, window: &Window, frame: OverlayFrame<'_>);

    /// Uploads geometry and textures. Returned command buffers are submitted
    /// ahead of the frame's own.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer>;

    fn paint(&self, pass: &mut wgpu::RenderPass<'static>);
}

/// Overlay that draws nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoOverlay;

impl OverlayPainter for NoOverlay {
    fn build(&mut self, _window: &Window, _frame: OverlayFrame<'_>) {}

    fn prepare(
        &mut self,
        _device: &wgpu::Device,
        _queue: &wgpu::Queue,
        _encoder: &mut wgpu::CommandEncoder,
        _size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        Vec::new()
    }

    fn paint(&self, _pass: &mut wgpu::RenderPass<'static>) {}
}
