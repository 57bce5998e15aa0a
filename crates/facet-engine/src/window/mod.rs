//! Window and engine loop.
//!
//! Owns the `winit` EventLoop and Window and drives camera input, the
//! overlay and the renderer once per redraw.

mod runtime;

pub use runtime::{Engine, EngineConfig, InputCapture};
