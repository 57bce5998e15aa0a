use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::GpuInit;
use crate::input::platform::winit::translate_window_event;
use crate::input::{dispatch_resize, EventQueue, InputEvent, InputProvider, Key, MouseButton};
use crate::overlay::{DebugOverlay, NoOverlay, OverlayFrame, OverlayPainter};
use crate::render::{FrameOutcome, Renderer, RendererConfig};
use crate::scene::Camera;
use crate::time::{FixedStep, FrameClock};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
    pub renderer: RendererConfig,
    /// Starting camera.
    pub camera: Camera,
    pub debug_overlay: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "facet".to_string(),
            initial_size: LogicalSize::new(1920.0, 1080.0),
            gpu: GpuInit::default(),
            renderer: RendererConfig::default(),
            camera: Camera::default(),
            debug_overlay: true,
        }
    }
}

/// Which inputs the overlay currently claims.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct InputCapture {
    pub pointer: bool,
    pub keyboard: bool,
}

/// Top-level owner of the window, camera, renderer and overlay.
pub struct Engine;

impl Engine {
    /// Opens the window and runs until the user quits.
    ///
    /// `setup` runs once, right after the renderer is initialized, and is
    /// where models are loaded and renderables added.
    pub fn run<F>(config: EngineConfig, setup: F) -> Result<()>
    where
        F: FnOnce(&mut Renderer<'_>) -> Result<()>,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = EngineState::new(config, setup);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<'this>,
}

// Field order is teardown order: overlay, then renderer, then window.
struct EngineState<F> {
    overlay: Option<DebugOverlay>,
    entry: Option<WindowEntry>,

    config: EngineConfig,
    setup: Option<F>,
    camera: Camera,
    input: EventQueue,
    clock: FrameClock,
    step: FixedStep,

    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<F> EngineState<F>
where
    F: FnOnce(&mut Renderer<'_>) -> Result<()>,
{
    fn new(config: EngineConfig, setup: F) -> Self {
        Self {
            overlay: None,
            entry: None,
            camera: config.camera.clone(),
            config,
            setup: Some(setup),
            input: EventQueue::new(),
            clock: FrameClock::new(),
            step: FixedStep::default(),
            exit_requested: false,
            error: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = &self.config.gpu;
        let renderer_config = self.config.renderer.clone();
        let mut entry = WindowEntryTryBuilder {
            window,
            renderer_builder: |w| Renderer::new(w, gpu_init, renderer_config),
        }
        .try_build()?;

        if let Some(setup) = self.setup.take() {
            entry
                .with_renderer_mut(|r| setup(r))
                .context("scene setup failed")?;
        }

        let count = entry.with_renderer(|r| r.scene().len());
        log::info!("scene ready with {count} renderables");

        if self.config.debug_overlay {
            self.overlay = Some(entry.with(|f| {
                DebugOverlay::new(
                    f.window,
                    f.renderer.device(),
                    f.renderer.surface_format(),
                    f.renderer.sample_count(),
                )
            }));
        }

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        self.clock.reset();
        Ok(())
    }

    fn capture(&self) -> InputCapture {
        self.overlay
            .as_ref()
            .map_or(InputCapture::default(), |o| InputCapture {
                pointer: o.wants_pointer(),
                keyboard: o.wants_keyboard(),
            })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let time = self.clock.tick();
        let events = self.input.poll_events();
        let capture = self.capture();

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        // Resize before anything reads the viewport.
        entry.with_renderer_mut(|r| {
            dispatch_resize(&events, r);
        });

        if drive_camera(&mut self.camera, &events, &self.input, capture, time.dt) {
            self.request_exit(event_loop);
            return;
        }

        self.step.advance(f64::from(time.dt), |_| {});

        let camera = &mut self.camera;
        let mut fallback = NoOverlay;
        let overlay: &mut dyn OverlayPainter = match self.overlay.as_mut() {
            Some(o) => o,
            None => &mut fallback,
        };

        let outcome = entry.with_mut(|f| {
            let viewport = f.renderer.viewport();
            overlay.build(
                f.window,
                OverlayFrame {
                    camera: &mut *camera,
                    scene: f.renderer.scene_mut(),
                    viewport,
                },
            );
            f.renderer.render_frame(camera, overlay)
        });

        if let Some(e) = frame_error(outcome) {
            log::error!("shutting down: {e}");
            self.error.get_or_insert(e);
            self.request_exit(event_loop);
        }
    }
}

impl<F> ApplicationHandler for EngineState<F>
where
    F: FnOnce(&mut Renderer<'_>) -> Result<()>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("failed to start engine: {e:#}");
            self.error = Some(e);
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_ref() else {
            return;
        };

        let consumed = match self.overlay.as_mut() {
            Some(overlay) => entry.with_window(|w| overlay.on_window_event(w, &event)),
            None => false,
        };

        let input = &mut self.input;
        let translated = entry.with_window(|w| translate_window_event(w, input.state(), &event));

        if let Some(ev) = translated {
            if ev == InputEvent::Quit {
                self.request_exit(event_loop);
                return;
            }
            if forward_to_camera(&ev, consumed) {
                input.push(ev);
            }
        }

        if matches!(event, WindowEvent::RedrawRequested) {
            self.redraw(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.overlay = None;
        self.entry = None;
        log::info!("engine stopped");
    }
}

/// A fatal frame ends the run with an error so the process exits non-zero.
fn frame_error(outcome: FrameOutcome) -> Option<anyhow::Error> {
    match outcome {
        FrameOutcome::Fatal => Some(anyhow!(
            "rendering cannot continue: GPU device or surface failed"
        )),
        FrameOutcome::Presented | FrameOutcome::Skipped => None,
    }
}

/// Presses the overlay consumed never reach the camera; releases, motion and
/// window events always do so held state cannot get stuck.
fn forward_to_camera(ev: &InputEvent, consumed_by_overlay: bool) -> bool {
    match ev {
        InputEvent::MouseDown { .. } | InputEvent::KeyDown(_) => !consumed_by_overlay,
        _ => true,
    }
}

/// Applies one frame of events and held input to the camera.
///
/// Left-drag looks around, W/S/A/D/Space/X fly. Returns true when the user
/// asked to quit.
fn drive_camera(
    camera: &mut Camera,
    events: &[InputEvent],
    input: &dyn InputProvider,
    capture: InputCapture,
    dt: f32,
) -> bool {
    let mut quit = false;

    for ev in events {
        match ev {
            InputEvent::Quit => quit = true,
            InputEvent::KeyDown(Key::Escape) if !capture.keyboard => quit = true,
            InputEvent::MouseDown {
                button: MouseButton::Left,
                x,
                y,
            } if !capture.pointer => camera.begin_drag(*x, *y),
            InputEvent::MouseUp {
                button: MouseButton::Left,
            }
            | InputEvent::FocusLost => camera.end_drag(),
            _ => {}
        }
    }

    if !capture.pointer {
        let (x, y) = input.mouse_position();
        camera.update_drag(x, y);
    }
    if !capture.keyboard {
        camera.apply_keyboard(input, dt);
    }

    quit
}
