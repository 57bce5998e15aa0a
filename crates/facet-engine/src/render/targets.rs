use crate::resource::GpuHandle;

/// Multisampled color and depth attachments sized to the drawable.
///
/// The color target resolves into the swapchain texture; neither target is
/// ever sampled.
#[derive(Debug)]
pub struct FrameTargets {
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    _color: GpuHandle<wgpu::Texture>,
    _depth: GpuHandle<wgpu::Texture>,
    extent: (u32, u32),
}

impl FrameTargets {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        extent: (u32, u32),
    ) -> Self {
        let color = device.create_texture(&attachment_desc(
            "facet msaa color",
            color_format,
            sample_count,
            extent,
        ));
        let depth = device.create_texture(&attachment_desc(
            "facet msaa depth",
            depth_format,
            sample_count,
            extent,
        ));

        log::debug!(
            "frame targets allocated: {}x{} x{} samples",
            extent.0,
            extent.1,
            sample_count
        );

        Self {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            _color: GpuHandle::new("msaa color", color),
            _depth: GpuHandle::new("msaa depth", depth),
            extent,
        }
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }
}

fn attachment_desc(
    label: &'static str,
    format: wgpu::TextureFormat,
    sample_count: u32,
    (width, height): (u32, u32),
) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachments_match_drawable_and_sample_count() {
        let desc = attachment_desc(
            "color",
            wgpu::TextureFormat::Bgra8UnormSrgb,
            4,
            (1920, 1080),
        );
        assert_eq!(desc.size.width, 1920);
        assert_eq!(desc.size.height, 1080);
        assert_eq!(desc.sample_count, 4);
        assert_eq!(desc.mip_level_count, 1);
        assert_eq!(desc.usage, wgpu::TextureUsages::RENDER_ATTACHMENT);
    }
}
