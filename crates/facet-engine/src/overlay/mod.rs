//! Screen-space overlay drawn on top of the scene.
//!
//! The renderer only knows [`OverlayPainter`]; [`DebugOverlay`] is the egui
//! inspector shipped with the viewer.

mod debug;
mod painter;
mod probe;

pub use debug::DebugOverlay;
pub use painter::{NoOverlay, OverlayFrame, OverlayPainter};
pub use probe::{to_ui_points, ProbeState, PROBE_LENGTH};
