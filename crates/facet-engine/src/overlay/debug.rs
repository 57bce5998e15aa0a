use egui::{Align2, Color32, FontId, LayerId, Painter, Pos2, Stroke};
use glam::{Mat4, Vec3};
use winit::event::WindowEvent;
use winit::window::Window;

use super::painter::{OverlayFrame, OverlayPainter};
use super::probe::{to_ui_points, ProbeState};
use crate::coords::Viewport;
use crate::scene::{Camera, Scene};

const CROSSHAIR_HALF: f32 = 10.0;
const LINE_WIDTH: f32 = 2.0;
const LABEL_SIZE: f32 = 14.0;
const DEFAULT_TELEPORT: [f32; 3] = [490.0, -281.0, -4387.0];

/// Geometry produced by `build`, consumed by `prepare` and `paint`.
struct PreparedFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    pixels_per_point: f32,
}

/// Texture changes not yet uploaded.
///
/// egui sends each allocation once and later frames only patch it, so the
/// delta of a frame that never reached `prepare` is folded into the next.
#[derive(Default)]
struct PendingTextures {
    delta: egui::TexturesDelta,
}

impl PendingTextures {
    fn merge(&mut self, newer: egui::TexturesDelta) {
        self.delta.append(newer);
    }

    fn take(&mut self) -> egui::TexturesDelta {
        std::mem::take(&mut self.delta)
    }
}

/// Inspector overlay: renderable list, camera and lighting controls, the
/// crosshair probe and on-screen labels.
pub struct DebugOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    probe: ProbeState,
    teleport_target: [f32; 3],
    prepared: Option<PreparedFrame>,
    pending: PendingTextures,
    screen: Option<egui_wgpu::ScreenDescriptor>,
    to_free: Vec<egui::TextureId>,
}

impl DebugOverlay {
    pub fn new(
        window: &Window,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            format,
            egui_wgpu::RendererOptions {
                msaa_samples: sample_count,
                depth_stencil_format: None,
                ..Default::default()
            },
        );
        log::info!("debug overlay ready");

        Self {
            ctx,
            state,
            renderer,
            probe: ProbeState::default(),
            teleport_target: DEFAULT_TELEPORT,
            prepared: None,
            pending: PendingTextures::default(),
            screen: None,
            to_free: Vec::new(),
        }
    }

    /// Feeds a window event to the UI. Returns true when the UI consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// The pointer is over or dragging a UI element.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input()
    }

    /// A text field or other widget has keyboard focus.
    pub fn wants_keyboard(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    pub fn probe(&self) -> &ProbeState {
        &self.probe
    }
}

impl OverlayPainter for DebugOverlay {
    fn build(&mut self, window: &Window, frame: OverlayFrame<'_>) {
        let raw_input = self.state.take_egui_input(window);
        let OverlayFrame {
            camera,
            scene,
            viewport,
        } = frame;

        let probe = &mut self.probe;
        let teleport_target = &mut self.teleport_target;
        let output = self.ctx.run(raw_input, |ctx| {
            draw_interface(ctx, camera, scene, viewport, probe, teleport_target);
        });

        self.state
            .handle_platform_output(window, output.platform_output);
        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);

        self.pending.merge(output.textures_delta);
        self.prepared = Some(PreparedFrame {
            paint_jobs,
            pixels_per_point: output.pixels_per_point,
        });
    }

    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        for id in self.to_free.drain(..) {
            self.renderer.free_texture(&id);
        }

        let Some(prepared) = self.prepared.as_ref() else {
            self.screen = None;
            return Vec::new();
        };

        let textures = self.pending.take();
        for (id, delta) in &textures.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.to_free = textures.free;

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: prepared.pixels_per_point,
        };
        let commands =
            self.renderer
                .update_buffers(device, queue, encoder, &prepared.paint_jobs, &screen);
        self.screen = Some(screen);
        commands
    }

    fn paint(&self, pass: &mut wgpu::RenderPass<'static>) {
        if let (Some(prepared), Some(screen)) = (self.prepared.as_ref(), self.screen.as_ref()) {
            self.renderer.render(pass, &prepared.paint_jobs, screen);
        }
    }
}

/// Per-frame projection inputs shared by all screen-space markers.
struct Projector<'a> {
    camera: &'a Camera,
    view: Mat4,
    projection: Mat4,
    viewport: Viewport,
    pixels_per_point: f32,
}

impl Projector<'_> {
    fn to_screen(&self, world: Vec3) -> Option<Pos2> {
        let point = self
            .camera
            .world_to_screen(world, self.projection, self.view, self.viewport);
        to_ui_points(point, self.pixels_per_point).map(|p| Pos2::new(p.x, p.y))
    }
}

fn draw_interface(
    ctx: &egui::Context,
    camera: &mut Camera,
    scene: &mut Scene,
    viewport: Viewport,
    probe: &mut ProbeState,
    teleport_target: &mut [f32; 3],
) {
    let ppp = ctx.pixels_per_point();
    let painter = ctx.layer_painter(LayerId::background());
    let centre = Pos2::new(viewport.width / ppp * 0.5, viewport.height / ppp * 0.5);
    let stroke = Stroke::new(LINE_WIDTH, Color32::WHITE);

    draw_crosshair(&painter, centre, stroke);

    // Markers use this frame's matrices even if a button moves the camera.
    let snapshot = camera.clone();
    let projector = Projector {
        camera: &snapshot,
        view: snapshot.view(),
        projection: snapshot.projection(viewport.aspect_ratio()),
        viewport,
        pixels_per_point: ppp,
    };

    egui::Window::new("Renderables").show(ctx, |ui| {
        for (index, (_, renderable)) in scene.iter_mut().enumerate() {
            let title = format!("{} ({index})", renderable.name());
            egui::CollapsingHeader::new(title.as_str())
                .id_salt(index)
                .show(ui, |ui| {
                    let position = renderable.position();
                    let on_screen = projector.to_screen(position);

                    if let Some(at) = on_screen {
                        painter.line_segment([centre, at], stroke);
                        painter.text(
                            at,
                            Align2::LEFT_TOP,
                            &title,
                            label_font(),
                            Color32::WHITE,
                        );
                    }

                    ui.label(format!(
                        "Position: ({:.2}, {:.2}, {:.2})",
                        position.x, position.y, position.z
                    ));
                    ui.label(if on_screen.is_some() {
                        "Status: in front of the camera"
                    } else {
                        "Status: behind the camera"
                    });

                    ui.horizontal(|ui| {
                        if ui.button("Teleport").clicked() {
                            camera.teleport(position);
                        }
                        if ui.button("Look At").clicked() {
                            camera.look_at(position);
                        }
                    });

                    let mut edited = position.to_array();
                    if drag_vec3(ui, "Position", &mut edited, 0.1) {
                        renderable.set_position(Vec3::from(edited));
                    }
                });
        }
    });

    egui::Window::new("Camera Controls").show(ctx, |ui| {
        ui.label(format!(
            "Drawable size: ({:.0}, {:.0})",
            viewport.width, viewport.height
        ));
        ui.label(format!(
            "UI display size: ({:.0}, {:.0})",
            viewport.width / ppp,
            viewport.height / ppp
        ));
        let p = camera.position();
        ui.label(format!("Camera position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));

        drag_vec3(ui, "Teleport coordinates", teleport_target, 1.0);
        if ui.button("Teleport").clicked() {
            camera.teleport(Vec3::from(*teleport_target));
        }
    });

    egui::Window::new("Lighting Controls").show(ctx, |ui| {
        let light = scene.light_mut();
        ui.horizontal(|ui| {
            let mut ambient = light.ambient.to_array();
            if ui.color_edit_button_rgb(&mut ambient).changed() {
                light.ambient = Vec3::from(ambient);
            }
            ui.label("Ambient light");
        });
        ui.horizontal(|ui| {
            let mut color = light.color.to_array();
            if ui.color_edit_button_rgb(&mut color).changed() {
                light.color = Vec3::from(color);
            }
            ui.label("Light color");
        });
    });

    probe.update(camera, |from, to| scene.trace_line(from, to));
    egui::Window::new("Ray Tracing").show(ctx, |ui| {
        let s = probe.start();
        let e = probe.end();
        ui.label(format!("Start: ({:.2}, {:.2}, {:.2})", s.x, s.y, s.z));
        ui.label(format!("End: ({:.2}, {:.2}, {:.2})", e.x, e.y, e.z));

        match probe.hit() {
            Some((id, at)) => {
                let name = scene.get(id).map_or("?", |r| r.name());
                ui.label(format!(
                    "Intersection: ({:.2}, {:.2}, {:.2}) on {name}",
                    at.x, at.y, at.z
                ));
                if let Some(pos) = projector.to_screen(at) {
                    painter.text(
                        pos,
                        Align2::LEFT_TOP,
                        "Intersection",
                        label_font(),
                        Color32::WHITE,
                    );
                }
            }
            None => {
                ui.label("Intersection: none");
            }
        }
    });
}

fn draw_crosshair(painter: &Painter, centre: Pos2, stroke: Stroke) {
    painter.line_segment(
        [
            Pos2::new(centre.x - CROSSHAIR_HALF, centre.y),
            Pos2::new(centre.x + CROSSHAIR_HALF, centre.y),
        ],
        stroke,
    );
    painter.line_segment(
        [
            Pos2::new(centre.x, centre.y - CROSSHAIR_HALF),
            Pos2::new(centre.x, centre.y + CROSSHAIR_HALF),
        ],
        stroke,
    );
}

fn drag_vec3(ui: &mut egui::Ui, label: &str, value: &mut [f32; 3], speed: f64) -> bool {
    ui.horizontal(|ui| {
        let mut changed = false;
        for v in value.iter_mut() {
            changed |= ui.add(egui::DragValue::new(v).speed(speed)).changed();
        }
        ui.label(label);
        changed
    })
    .inner
}

fn label_font() -> FontId {
    FontId::proportional(LABEL_SIZE)
}
