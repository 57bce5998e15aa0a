//! Frame lifecycle, render targets, pipelines and the per-frame passes.
//!
//! A frame is one scene pass into multisampled targets followed by one
//! overlay pass that loads the scene result; both resolve into the drawable.

mod lifecycle;
mod pass;
mod pipeline;
mod renderer;
mod targets;

pub use lifecycle::{FrameGate, FrameLifecycle, LifecycleError, RendererState};
pub use pass::{FramePass, PassPhase};
pub use pipeline::{
    BindingLayouts, PipelineCache, PipelineDesc, PipelineError, PipelineManager, TargetFormats,
};
pub use renderer::{FrameOutcome, Renderer, RendererConfig, DEBUG_PIPELINE, STANDARD_PIPELINE};
pub use targets::FrameTargets;
