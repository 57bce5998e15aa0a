//! Time subsystem.
//!
//! - `FrameClock`: one per window, ticked once per redraw
//! - `FixedStep`: fixed-rate update accumulator fed by the clock

mod fixed_step;
mod frame_clock;

pub use fixed_step::FixedStep;
pub use frame_clock::{FrameClock, FrameTime};
