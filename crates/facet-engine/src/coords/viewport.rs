/// Screen-space viewport rectangle in physical pixels.
///
/// Origin is top-left, +Y down, matching wgpu's framebuffer coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Full-surface viewport for a drawable of `width` × `height` pixels.
    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width / height, or 1.0 for a degenerate viewport.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_valid() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_full_hd() {
        let vp = Viewport::from_size(1920, 1080);
        assert!((vp.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_viewport_has_unit_aspect() {
        assert_eq!(Viewport::from_size(0, 0).aspect_ratio(), 1.0);
        assert!(!Viewport::from_size(100, 0).is_valid());
    }
}
