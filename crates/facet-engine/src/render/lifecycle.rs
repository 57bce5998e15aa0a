use std::fmt;

/// Renderer lifecycle state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererState {
    Uninitialized,
    Ready,
    Rendering,
    Resizing,
    Destroyed,
}

/// An operation was requested in a state that does not allow it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LifecycleError {
    pub state: RendererState,
    pub operation: &'static str,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} while {:?}", self.operation, self.state)
    }
}

impl std::error::Error for LifecycleError {}

/// Whether a frame may be recorded.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameGate {
    Proceed,
    /// Drawable is 0x0; no targets exist.
    Minimized,
}

/// Frame/resize bookkeeping without any GPU objects.
///
/// Tracks the drawable extent, whether frame targets exist for it, and a
/// generation counter bumped every time targets are reallocated. Any drawable
/// obtained before a resize is marked stale until the next frame completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLifecycle {
    state: RendererState,
    extent: (u32, u32),
    targets_extent: Option<(u32, u32)>,
    generation: u64,
    drawable_stale: bool,
}

impl Default for FrameLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLifecycle {
    pub fn new() -> Self {
        Self {
            state: RendererState::Uninitialized,
            extent: (0, 0),
            targets_extent: None,
            generation: 0,
            drawable_stale: false,
        }
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    /// Extent the frame targets were allocated at, `None` while minimized.
    pub fn targets_extent(&self) -> Option<(u32, u32)> {
        self.targets_extent
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn drawable_stale(&self) -> bool {
        self.drawable_stale
    }

    pub fn is_minimized(&self) -> bool {
        self.extent.0 == 0 || self.extent.1 == 0
    }

    /// Records the initial drawable extent. Returns whether targets should be
    /// allocated now.
    pub fn initialize(&mut self, width: u32, height: u32) -> Result<bool, LifecycleError> {
        self.expect(RendererState::Uninitialized, "initialize")?;
        self.extent = (width, height);
        self.state = RendererState::Ready;
        Ok(self.commit_targets())
    }

    /// Starts a resize. Returns whether targets should be allocated at the new
    /// extent; `false` means the drawable is 0x0 and allocation is deferred.
    pub fn begin_resize(&mut self, width: u32, height: u32) -> Result<bool, LifecycleError> {
        self.expect(RendererState::Ready, "resize")?;
        self.state = RendererState::Resizing;
        self.extent = (width, height);
        self.drawable_stale = true;
        Ok(!self.is_minimized())
    }

    pub fn finish_resize(&mut self) -> Result<(), LifecycleError> {
        self.expect(RendererState::Resizing, "finish resize")?;
        self.commit_targets();
        self.state = RendererState::Ready;
        Ok(())
    }

    pub fn begin_frame(&mut self) -> Result<FrameGate, LifecycleError> {
        self.expect(RendererState::Ready, "begin frame")?;
        if self.targets_extent.is_none() {
            return Ok(FrameGate::Minimized);
        }
        self.state = RendererState::Rendering;
        Ok(FrameGate::Proceed)
    }

    /// Ends a frame whether it was presented or dropped.
    pub fn end_frame(&mut self) -> Result<(), LifecycleError> {
        self.expect(RendererState::Rendering, "end frame")?;
        self.drawable_stale = false;
        self.state = RendererState::Ready;
        Ok(())
    }

    pub fn destroy(&mut self) {
        self.state = RendererState::Destroyed;
        self.targets_extent = None;
    }

    fn commit_targets(&mut self) -> bool {
        if self.is_minimized() {
            self.targets_extent = None;
            return false;
        }
        if self.targets_extent != Some(self.extent) {
            self.targets_extent = Some(self.extent);
            self.generation += 1;
        }
        true
    }

    fn expect(&self, state: RendererState, operation: &'static str) -> Result<(), LifecycleError> {
        if self.state == state {
            Ok(())
        } else {
            Err(LifecycleError {
                state: self.state,
                operation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(width: u32, height: u32) -> FrameLifecycle {
        let mut lc = FrameLifecycle::new();
        assert!(lc.initialize(width, height).unwrap());
        lc
    }

    fn resize(lc: &mut FrameLifecycle, width: u32, height: u32) -> bool {
        let allocate = lc.begin_resize(width, height).unwrap();
        lc.finish_resize().unwrap();
        allocate
    }

    // ── resize ───────────────────────────────────────────────────────────

    #[test]
    fn resize_matches_new_extent() {
        let mut lc = ready(800, 600);
        assert!(resize(&mut lc, 1024, 768));
        assert_eq!(lc.extent(), (1024, 768));
        assert_eq!(lc.targets_extent(), Some((1024, 768)));
        assert_eq!(lc.generation(), 2);
    }

    #[test]
    fn resize_marks_drawable_stale_until_next_frame() {
        let mut lc = ready(800, 600);
        resize(&mut lc, 1024, 768);
        assert!(lc.drawable_stale());

        assert_eq!(lc.begin_frame().unwrap(), FrameGate::Proceed);
        lc.end_frame().unwrap();
        assert!(!lc.drawable_stale());
    }

    #[test]
    fn zero_size_defers_targets_and_skips_frames() {
        let mut lc = ready(800, 600);
        assert!(!resize(&mut lc, 0, 0));
        assert!(lc.is_minimized());
        assert_eq!(lc.targets_extent(), None);
        assert_eq!(lc.begin_frame().unwrap(), FrameGate::Minimized);
        assert_eq!(lc.state(), RendererState::Ready);

        assert!(resize(&mut lc, 640, 480));
        assert_eq!(lc.targets_extent(), Some((640, 480)));
        assert_eq!(lc.begin_frame().unwrap(), FrameGate::Proceed);
    }

    #[test]
    fn same_extent_keeps_generation() {
        let mut lc = ready(800, 600);
        resize(&mut lc, 800, 600);
        assert_eq!(lc.generation(), 1);
        assert!(lc.drawable_stale());
    }

    // ── transitions ──────────────────────────────────────────────────────

    #[test]
    fn cannot_render_before_initialize() {
        let mut lc = FrameLifecycle::new();
        let err = lc.begin_frame().unwrap_err();
        assert_eq!(err.state, RendererState::Uninitialized);
    }

    #[test]
    fn cannot_resize_mid_frame() {
        let mut lc = ready(800, 600);
        lc.begin_frame().unwrap();
        assert!(lc.begin_resize(10, 10).is_err());
        lc.end_frame().unwrap();
        assert!(lc.begin_resize(10, 10).is_ok());
    }

    #[test]
    fn destroyed_rejects_everything() {
        let mut lc = ready(800, 600);
        lc.destroy();
        assert!(lc.begin_frame().is_err());
        assert!(lc.begin_resize(1, 1).is_err());
        assert_eq!(
            lc.initialize(1, 1).unwrap_err().to_string(),
            "cannot initialize while Destroyed"
        );
    }

    #[test]
    fn initialize_minimized_defers_targets() {
        let mut lc = FrameLifecycle::new();
        assert!(!lc.initialize(0, 0).unwrap());
        assert_eq!(lc.begin_frame().unwrap(), FrameGate::Minimized);
    }
}
