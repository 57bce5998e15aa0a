//! Facet engine crate.
//!
//! Real-time OBJ scene viewer on wgpu: device and surface, frame lifecycle,
//! scene resources, camera, picking and the debug overlay.

pub mod asset;
pub mod coords;
pub mod device;
pub mod input;
pub mod overlay;
pub mod render;
pub mod resource;
pub mod scene;
pub mod time;
pub mod window;

pub mod logging;

pub use render::{Renderer, RendererConfig};
pub use scene::{Camera, RenderableId};
pub use window::{Engine, EngineConfig};
