//! Screen-space coordinate types.
//!
//! Canonical screen space:
//! - physical pixels
//! - origin top-left
//! - +X right, +Y down

mod screen;
mod viewport;

pub use screen::ScreenPoint;
pub use viewport::Viewport;
