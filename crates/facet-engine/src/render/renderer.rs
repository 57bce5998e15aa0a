use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::lifecycle::{FrameGate, FrameLifecycle, LifecycleError};
use super::pass::FramePass;
use super::pipeline::{PipelineDesc, PipelineError, PipelineManager, TargetFormats};
use super::targets::FrameTargets;
use crate::asset::{GeometryImporter, ImageDecoder, ImportError};
use crate::coords::Viewport;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::ResizeListener;
use crate::overlay::OverlayPainter;
use crate::resource::GpuHandle;
use crate::scene::{
    Camera, LightUniform, MaterialDefaults, Model, Renderable, RenderableId, Scene, SceneError,
    UploadContext,
};

pub const STANDARD_PIPELINE: &str = "standard";
pub const DEBUG_PIPELINE: &str = "debug";

/// Renderer tuning. Fixed for the renderer's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub sample_count: u32,
    pub clear_color: wgpu::Color,
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sample_count: 4,
            clear_color: wgpu::Color {
                r: 41.0 / 255.0,
                g: 42.0 / 255.0,
                b: 48.0 / 255.0,
                a: 1.0,
            },
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

/// Result of [`Renderer::render_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// No drawable this time (minimized, surface lost/outdated, timeout).
    Skipped,
    /// The device cannot continue; the caller should shut down.
    Fatal,
}

/// Owns the device, surface, frame targets, pipelines and the scene, and
/// records one scene pass plus one overlay pass per frame.
pub struct Renderer<'w> {
    scene: Scene,
    targets: Option<FrameTargets>,
    light_bind_group: wgpu::BindGroup,
    light_buffer: GpuHandle<wgpu::Buffer>,
    material_defaults: MaterialDefaults,
    pipelines: PipelineManager,
    pass: FramePass,
    lifecycle: FrameLifecycle,
    config: RendererConfig,
    gpu: Gpu<'w>,
}

impl<'w> Renderer<'w> {
    pub fn new(window: &'w Window, gpu_init: &GpuInit, config: RendererConfig) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, gpu_init))?;
        let device = gpu.device();

        let mut pipelines = PipelineManager::new(
            device,
            TargetFormats {
                color: gpu.surface_format(),
                depth: config.depth_format,
                sample_count: config.sample_count,
            },
        );
        pipelines
            .create_pipeline(device, STANDARD_PIPELINE, &standard_desc())
            .context("failed to build the standard pipeline")?;
        pipelines
            .create_pipeline(device, DEBUG_PIPELINE, &debug_desc())
            .context("failed to build the debug pipeline")?;

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("facet light"),
            size: std::mem::size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("facet light"),
            layout: &pipelines.layouts().light,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let material_defaults = MaterialDefaults::new(device, gpu.queue());

        let mut lifecycle = FrameLifecycle::new();
        let size = gpu.size();
        let targets = lifecycle
            .initialize(size.width, size.height)?
            .then(|| {
                FrameTargets::new(
                    device,
                    gpu.surface_format(),
                    config.depth_format,
                    config.sample_count,
                    (size.width, size.height),
                )
            });

        Ok(Self {
            scene: Scene::new(),
            targets,
            light_bind_group,
            light_buffer: GpuHandle::new("light", light_buffer),
            material_defaults,
            pipelines,
            pass: FramePass::new(config.clear_color),
            lifecycle,
            config,
            gpu,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu.surface_format()
    }

    pub fn sample_count(&self) -> u32 {
        self.config.sample_count
    }

    pub fn lifecycle(&self) -> &FrameLifecycle {
        &self.lifecycle
    }

    /// Full-drawable viewport in physical pixels.
    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.lifecycle.extent();
        Viewport::from_size(w, h)
    }

    pub fn pipelines(&self) -> &PipelineManager {
        &self.pipelines
    }

    pub fn create_pipeline(&mut self, name: &str, desc: &PipelineDesc<'_>) -> Result<(), PipelineError> {
        self.pipelines
            .create_pipeline(self.gpu.device(), name, desc)
            .map(|_| ())
    }

    pub fn upload_context(&self) -> UploadContext<'_> {
        UploadContext {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            material_layout: &self.pipelines.layouts().material,
            material_defaults: &self.material_defaults,
        }
    }

    pub fn load_model(
        &self,
        path: &Path,
        importer: &dyn GeometryImporter,
        decoder: &dyn ImageDecoder,
    ) -> Result<Arc<Model>, ImportError> {
        Model::load(self.upload_context(), importer, decoder, path).map(Arc::new)
    }

    pub fn add_renderable(
        &mut self,
        pipeline: &str,
        model: Arc<Model>,
        position: Vec3,
        name: Option<&str>,
    ) -> Result<RenderableId, SceneError> {
        let renderable =
            Renderable::new(self.gpu.device(), &self.pipelines, pipeline, model, position, name)?;
        log::debug!("renderable '{}' added at {position}", renderable.name());
        Ok(self.scene.add(renderable))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Reconfigures the surface and reallocates frame targets at the new
    /// size. A 0x0 size releases the targets until a real size arrives.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), LifecycleError> {
        let generation = self.lifecycle.generation();
        let allocate = self.lifecycle.begin_resize(width, height)?;

        self.gpu.resize(PhysicalSize::new(width, height));
        self.lifecycle.finish_resize()?;

        if !allocate {
            self.targets = None;
            log::debug!("drawable minimized; frame targets released");
        } else if self.targets.is_none() || self.lifecycle.generation() != generation {
            self.targets = None;
            self.targets = Some(FrameTargets::new(
                self.gpu.device(),
                self.gpu.surface_format(),
                self.config.depth_format,
                self.config.sample_count,
                (width, height),
            ));
        }
        Ok(())
    }

    /// Records, submits and presents one frame. Never waits for the GPU.
    pub fn render_frame(&mut self, camera: &Camera, overlay: &mut dyn OverlayPainter) -> FrameOutcome {
        match self.lifecycle.begin_frame() {
            Ok(FrameGate::Proceed) => {}
            Ok(FrameGate::Minimized) => return FrameOutcome::Skipped,
            Err(e) => {
                log::error!("{e}");
                return FrameOutcome::Fatal;
            }
        }

        let outcome = self.record_and_submit(camera, overlay);
        if let Err(e) = self.lifecycle.end_frame() {
            log::error!("{e}");
            return FrameOutcome::Fatal;
        }
        outcome
    }

    fn record_and_submit(&mut self, camera: &Camera, overlay: &mut dyn OverlayPainter) -> FrameOutcome {
        let Some(targets) = self.targets.as_ref() else {
            return FrameOutcome::Skipped;
        };

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("drawable acquisition failed: {err}");
                        FrameOutcome::Fatal
                    }
                    action => {
                        log::debug!("frame skipped ({action:?}): {err}");
                        FrameOutcome::Skipped
                    }
                };
            }
        };

        let queue = self.gpu.queue();
        let (width, height) = targets.extent();
        let viewport = Viewport::from_size(width, height);
        let view = camera.view();
        let projection = camera.projection(viewport.aspect_ratio());

        let light = self.scene.resolved_light().to_uniform();
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&light));
        for (_, renderable) in self.scene.iter() {
            renderable.write_transform(queue, view, projection);
        }

        self.pass.patch_for_scene();
        {
            let mut rpass = self.pass.begin(&mut frame.encoder, targets, &frame.view);
            rpass.set_viewport(0.0, 0.0, viewport.width, viewport.height, 0.0, 1.0);
            rpass.set_bind_group(1, &self.light_bind_group, &[]);
            for (_, renderable) in self.scene.iter() {
                renderable.draw(&mut rpass);
            }
        }

        let overlay_commands =
            overlay.prepare(self.gpu.device(), queue, &mut frame.encoder, [width, height]);

        self.pass.patch_for_overlay();
        {
            let mut rpass = self
                .pass
                .begin(&mut frame.encoder, targets, &frame.view)
                .forget_lifetime();
            overlay.paint(&mut rpass);
        }

        self.gpu.submit(frame, overlay_commands);
        FrameOutcome::Presented
    }
}

impl ResizeListener for Renderer<'_> {
    fn on_resize(&mut self, width: u32, height: u32) {
        if let Err(e) = self.resize(width, height) {
            log::error!("{e}");
        }
    }
}

impl Drop for Renderer<'_> {
    fn drop(&mut self) {
        self.lifecycle.destroy();
        log::debug!("renderer destroyed");
    }
}

fn standard_desc() -> PipelineDesc<'static> {
    PipelineDesc {
        wgsl: include_str!("shaders/standard.wgsl"),
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        cull_mode: None,
    }
}

fn debug_desc() -> PipelineDesc<'static> {
    PipelineDesc {
        wgsl: include_str!("shaders/debug.wgsl"),
        ..standard_desc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_4x_msaa_with_depth32() {
        let c = RendererConfig::default();
        assert_eq!(c.sample_count, 4);
        assert_eq!(c.depth_format, wgpu::TextureFormat::Depth32Float);
        assert!((c.clear_color.r - 41.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn builtin_pipelines_share_entry_points() {
        let (s, d) = (standard_desc(), debug_desc());
        assert_eq!(s.vertex_entry, d.vertex_entry);
        assert_eq!(s.fragment_entry, d.fragment_entry);
        assert_ne!(s.wgsl, d.wgsl);
        assert!(s.wgsl.contains("fn vs_main") && d.wgsl.contains("fn fs_main"));
    }
}
