use super::targets::FrameTargets;

/// Which of the two per-frame passes the descriptor is currently set up for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassPhase {
    /// Clears and draws the 3D scene.
    Scene,
    /// Loads the scene result and draws the overlay on top, no depth.
    Overlay,
}

/// Render pass setup, built once and patched for each pass of a frame.
///
/// Both passes render into the multisampled color target and resolve into
/// the drawable. The scene pass stores the multisampled color so the overlay
/// pass can load it.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePass {
    clear_color: wgpu::Color,
    depth_clear: f32,
    phase: PassPhase,
}

impl FramePass {
    pub fn new(clear_color: wgpu::Color) -> Self {
        Self {
            clear_color,
            depth_clear: 1.0,
            phase: PassPhase::Scene,
        }
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    pub fn patch_for_scene(&mut self) {
        self.phase = PassPhase::Scene;
    }

    pub fn patch_for_overlay(&mut self) {
        self.phase = PassPhase::Overlay;
    }

    pub fn color_ops(&self) -> wgpu::Operations<wgpu::Color> {
        let load = match self.phase {
            PassPhase::Scene => wgpu::LoadOp::Clear(self.clear_color),
            PassPhase::Overlay => wgpu::LoadOp::Load,
        };
        wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }
    }

    /// Depth is cleared each frame and never kept past the scene pass.
    pub fn depth_ops(&self) -> Option<wgpu::Operations<f32>> {
        match self.phase {
            PassPhase::Scene => Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.depth_clear),
                store: wgpu::StoreOp::Discard,
            }),
            PassPhase::Overlay => None,
        }
    }

    pub fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        drawable: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        let label = match self.phase {
            PassPhase::Scene => "facet scene pass",
            PassPhase::Overlay => "facet overlay pass",
        };

        let depth_stencil_attachment =
            self.depth_ops()
                .map(|ops| wgpu::RenderPassDepthStencilAttachment {
                    view: targets.depth_view(),
                    depth_ops: Some(ops),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: targets.color_view(),
                depth_slice: None,
                resolve_target: Some(drawable),
                ops: self.color_ops(),
            })],
            depth_stencil_attachment,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> FramePass {
        FramePass::new(wgpu::Color {
            r: 0.1,
            g: 0.2,
            b: 0.3,
            a: 1.0,
        })
    }

    #[test]
    fn scene_pass_clears_and_discards_depth() {
        let p = pass();
        let color = p.color_ops();
        assert_eq!(color.load, wgpu::LoadOp::Clear(p.clear_color()));
        assert_eq!(color.store, wgpu::StoreOp::Store);

        let depth = p.depth_ops().unwrap();
        assert_eq!(depth.load, wgpu::LoadOp::Clear(1.0));
        assert_eq!(depth.store, wgpu::StoreOp::Discard);
    }

    #[test]
    fn overlay_pass_loads_without_depth() {
        let mut p = pass();
        p.patch_for_overlay();
        assert_eq!(p.color_ops().load, wgpu::LoadOp::Load);
        assert!(p.depth_ops().is_none());
    }

    #[test]
    fn patching_back_restores_clear() {
        let mut p = pass();
        p.patch_for_overlay();
        p.patch_for_scene();
        assert_eq!(p.phase(), PassPhase::Scene);
        assert!(matches!(p.color_ops().load, wgpu::LoadOp::Clear(_)));
    }
}
