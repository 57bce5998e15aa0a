use glam::Vec2;

/// Result of projecting a world position onto the screen.
///
/// `Invalid` is returned for points behind the eye (clip-space w ≤ 0); its
/// coordinate form is `(-∞, -∞)` so it can never be mistaken for a real
/// on-screen location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScreenPoint {
    Visible(Vec2),
    Invalid,
}

impl ScreenPoint {
    pub const INVALID_COORD: Vec2 = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);

    pub fn is_valid(self) -> bool {
        matches!(self, ScreenPoint::Visible(_))
    }

    pub fn position(self) -> Option<Vec2> {
        match self {
            ScreenPoint::Visible(p) => Some(p),
            ScreenPoint::Invalid => None,
        }
    }

    /// Coordinate form; the sentinel for invalid points.
    pub fn to_vec2(self) -> Vec2 {
        self.position().unwrap_or(Self::INVALID_COORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_maps_to_negative_infinity() {
        let v = ScreenPoint::Invalid.to_vec2();
        assert!(v.x.is_infinite() && v.x < 0.0);
        assert!(v.y.is_infinite() && v.y < 0.0);
    }

    #[test]
    fn visible_round_trips() {
        let p = ScreenPoint::Visible(Vec2::new(3.0, 4.0));
        assert!(p.is_valid());
        assert_eq!(p.to_vec2(), Vec2::new(3.0, 4.0));
    }
}
