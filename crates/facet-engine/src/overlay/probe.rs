use glam::{Vec2, Vec3};

use crate::coords::ScreenPoint;
use crate::scene::{Camera, RenderableId};

/// How far ahead of the camera the probe segment reaches.
pub const PROBE_LENGTH: f32 = 100.0;

/// "What is under the crosshair": a segment cast along the camera's view
/// direction, refreshed every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeState {
    start: Vec3,
    end: Vec3,
    hit: Option<(RenderableId, Vec3)>,
}

impl ProbeState {
    pub fn update<F>(&mut self, camera: &Camera, trace: F)
    where
        F: FnOnce(Vec3, Vec3) -> Option<(RenderableId, Vec3)>,
    {
        self.start = camera.position();
        self.end = self.start + camera.front() * PROBE_LENGTH;
        self.hit = trace(self.start, self.end);
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn hit(&self) -> Option<(RenderableId, Vec3)> {
        self.hit
    }
}

/// Physical-pixel screen point to UI points, `None` when not visible.
pub fn to_ui_points(point: ScreenPoint, pixels_per_point: f32) -> Option<Vec2> {
    point
        .position()
        .filter(|_| pixels_per_point > 0.0)
        .map(|p| p / pixels_per_point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::CameraSettings;

    #[test]
    fn segment_follows_camera_front() {
        let cam = Camera::new(Vec3::new(1.0, 2.0, 3.0), 0.0, 0.0, CameraSettings::default());
        let mut probe = ProbeState::default();
        probe.update(&cam, |_, _| None);

        assert_eq!(probe.start(), Vec3::new(1.0, 2.0, 3.0));
        assert!((probe.end() - Vec3::new(101.0, 2.0, 3.0)).length() < 1e-4);
        assert_eq!(probe.hit(), None);
    }

    #[test]
    fn trace_receives_segment_and_result_is_kept() {
        let cam = Camera::default();
        let mut probe = ProbeState::default();
        let mut seen = None;
        probe.update(&cam, |a, b| {
            seen = Some((a, b));
            Some((RenderableId(2), Vec3::new(0.0, 0.0, -4.0)))
        });

        assert_eq!(seen, Some((probe.start(), probe.end())));
        assert_eq!(probe.hit(), Some((RenderableId(2), Vec3::new(0.0, 0.0, -4.0))));
    }

    #[test]
    fn ui_points_divide_by_scale() {
        let p = ScreenPoint::Visible(Vec2::new(200.0, 100.0));
        assert_eq!(to_ui_points(p, 2.0), Some(Vec2::new(100.0, 50.0)));
        assert_eq!(to_ui_points(ScreenPoint::Invalid, 2.0), None);
    }
}
