use glam::{Mat4, Vec2, Vec3, Vec4};

use super::collision::Ray;
use crate::coords::{ScreenPoint, Viewport};
use crate::input::{InputProvider, Key};

const PITCH_LIMIT: f32 = 89.0;

/// Fly-camera movement directions, relative to the current basis.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Lens and control constants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of drag.
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            speed: 10.5,
            sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct DragState {
    active: bool,
    first_sample: bool,
    last: Vec2,
}

/// Yaw/pitch fly camera.
///
/// `front`, `right` and `up` are derived from yaw and pitch and recomputed on
/// every orientation change; together they form a right-handed orthonormal
/// basis. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    settings: CameraSettings,
    drag: DragState,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1.0), -90.0, 0.0, CameraSettings::default())
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32, settings: CameraSettings) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            settings,
            drag: DragState::default(),
        };
        camera.update_basis();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with wgpu's 0..1 depth range.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.settings.fov.to_radians(),
            aspect,
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.settings.sensitivity;
        self.pitch += dy * self.settings.sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_basis();
    }

    pub fn apply_movement(&mut self, direction: Movement, dt: f32) {
        let velocity = self.settings.speed * dt;
        let offset = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
            Movement::Up => self.up,
            Movement::Down => -self.up,
        };
        self.position += offset * velocity;
    }

    /// Samples held keys (W/S/A/D, Space, X) and moves accordingly.
    pub fn apply_keyboard(&mut self, input: &dyn InputProvider, dt: f32) {
        const BINDINGS: [(Key, Movement); 6] = [
            (Key::W, Movement::Forward),
            (Key::S, Movement::Backward),
            (Key::A, Movement::Left),
            (Key::D, Movement::Right),
            (Key::Space, Movement::Up),
            (Key::X, Movement::Down),
        ];
        for (key, movement) in BINDINGS {
            if input.key_down(key) {
                self.apply_movement(movement, dt);
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    /// Starts a drag. The first `update_drag` after this only records the
    /// cursor.
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        if !self.drag.active {
            self.drag = DragState {
                active: true,
                first_sample: true,
                last: Vec2::new(x, y),
            };
        }
    }

    pub fn end_drag(&mut self) {
        self.drag.active = false;
    }

    pub fn update_drag(&mut self, x: f32, y: f32) {
        if !self.drag.active {
            return;
        }
        if self.drag.first_sample {
            self.drag.last = Vec2::new(x, y);
            self.drag.first_sample = false;
        }

        // Screen Y grows downward.
        let dx = x - self.drag.last.x;
        let dy = self.drag.last.y - y;
        self.drag.last = Vec2::new(x, y);

        self.apply_mouse_delta(dx, dy, true);
    }

    /// Turns toward `target`. Pitch is clamped like mouse look so the basis
    /// stays well defined.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(direction) = (target - self.position).try_normalize() else {
            return;
        };
        self.pitch = direction
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = direction.z.atan2(direction.x).to_degrees();
        self.update_basis();
    }

    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Projects `world` into viewport pixels (top-left origin). Points at or
    /// behind the eye plane yield [`ScreenPoint::Invalid`].
    pub fn world_to_screen(
        &self,
        world: Vec3,
        projection: Mat4,
        view: Mat4,
        viewport: Viewport,
    ) -> ScreenPoint {
        let clip = projection * view * world.extend(1.0);
        if clip.w <= 0.0 {
            return ScreenPoint::Invalid;
        }

        let ndc = clip.truncate() / clip.w;
        ScreenPoint::Visible(Vec2::new(
            viewport.x + viewport.width * (ndc.x + 1.0) * 0.5,
            viewport.y + viewport.height * (1.0 - (ndc.y + 1.0) * 0.5),
        ))
    }

    /// Ray from the near plane through `screen` toward the far plane.
    pub fn screen_to_world_ray(
        &self,
        screen: Vec2,
        projection: Mat4,
        view: Mat4,
        viewport: Viewport,
    ) -> Option<Ray> {
        if !viewport.is_valid() {
            return None;
        }

        let ndc_x = (screen.x - viewport.x) / viewport.width * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen.y - viewport.y) / viewport.height * 2.0;
        let inverse = (projection * view).inverse();

        let unproject = |z: f32| {
            let p = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);

        let direction = (far - near).try_normalize()?;
        Some(Ray {
            origin: near,
            direction,
        })
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        // Straight up or down leaves `right` undefined; keep the last one.
        let right = self.front.cross(self.world_up);
        if right.length_squared() > f32::EPSILON * f32::EPSILON {
            self.right = right.normalize();
        }
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EventQueue, InputEvent};

    const EPS: f32 = 1e-5;

    fn viewport() -> Viewport {
        Viewport::from_size(1280, 720)
    }

    fn matrices(cam: &Camera) -> (Mat4, Mat4) {
        (cam.projection(viewport().aspect_ratio()), cam.view())
    }

    // ── basis ────────────────────────────────────────────────────────────

    #[test]
    fn default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.front() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
        assert!((cam.up() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn basis_is_orthonormal_over_yaw_pitch_grid() {
        let mut yaw = 0.0;
        while yaw < 360.0 {
            let mut pitch = -89.0;
            while pitch <= 89.0 {
                let cam = Camera::new(Vec3::ZERO, yaw, pitch, CameraSettings::default());
                let (f, r, u) = (cam.front(), cam.right(), cam.up());

                for v in [f, r, u] {
                    assert!((v.length() - 1.0).abs() < EPS, "yaw {yaw} pitch {pitch}");
                }
                assert!(f.dot(r).abs() < EPS);
                assert!(f.dot(u).abs() < EPS);
                assert!(r.dot(u).abs() < EPS);
                // right-handed: right x up == -front (camera looks down -z in view space)
                assert!((r.cross(u) + f).length() < 1e-4);

                pitch += 11.125;
            }
            yaw += 7.5;
        }
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut cam = Camera::default();
        cam.apply_mouse_delta(0.0, 10_000.0, true);
        assert_eq!(cam.pitch(), 89.0);
        cam.apply_mouse_delta(0.0, -20_000.0, true);
        assert_eq!(cam.pitch(), -89.0);
    }

    #[test]
    fn unconstrained_vertical_pitch_keeps_finite_basis() {
        let mut cam = Camera::default();
        let to_vertical = 90.0 / cam.settings().sensitivity;

        cam.apply_mouse_delta(0.0, to_vertical, false);
        assert!(cam.front().is_finite());
        assert!(cam.right().is_finite());
        assert!(cam.up().is_finite());
        assert!((cam.right() - Vec3::X).length() < 1e-3);
        assert!(cam.up().dot(cam.right()).abs() < 1e-3);

        cam.apply_mouse_delta(0.0, -2.0 * to_vertical, false);
        assert!(cam.right().is_finite());
        assert!(cam.up().is_finite());
        assert!(cam.view().is_finite());
    }

    // ── movement ─────────────────────────────────────────────────────────

    #[test]
    fn movement_scales_with_speed_and_dt() {
        let mut cam = Camera::default();
        cam.apply_movement(Movement::Forward, 2.0);
        let expected = Vec3::new(0.0, 0.0, 1.0) + Vec3::NEG_Z * 21.0;
        assert!((cam.position() - expected).length() < EPS);

        cam.apply_movement(Movement::Backward, 2.0);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 1.0)).length() < EPS);
    }

    #[test]
    fn keyboard_sampling_uses_held_keys() {
        let mut input = EventQueue::new();
        input.push(InputEvent::KeyDown(Key::D));
        input.push(InputEvent::KeyDown(Key::Space));

        let mut cam = Camera::default();
        cam.apply_keyboard(&input, 1.0);

        let expected = Vec3::new(10.5, 10.5, 1.0);
        assert!((cam.position() - expected).length() < 1e-4);
    }

    // ── drag ─────────────────────────────────────────────────────────────

    #[test]
    fn first_drag_sample_is_absorbed() {
        let mut cam = Camera::default();
        cam.begin_drag(10.0, 10.0);
        cam.update_drag(10.0, 10.0);
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);

        cam.update_drag(20.0, 10.0);
        assert!((cam.yaw() - (-90.0 + 10.0 * 0.1)).abs() < EPS);
        assert_eq!(cam.pitch(), 0.0);
    }

    #[test]
    fn drag_up_raises_pitch() {
        let mut cam = Camera::default();
        cam.begin_drag(0.0, 50.0);
        cam.update_drag(0.0, 50.0);
        cam.update_drag(0.0, 40.0);
        assert!(cam.pitch() > 0.0);
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut cam = Camera::default();
        cam.update_drag(100.0, 100.0);
        cam.begin_drag(0.0, 0.0);
        cam.end_drag();
        cam.update_drag(50.0, 50.0);
        assert_eq!(cam.yaw(), -90.0);
        assert!(!cam.is_dragging());
    }

    // ── look_at / teleport ───────────────────────────────────────────────

    #[test]
    fn look_at_points_front_at_target() {
        let mut cam = Camera::default();
        cam.teleport(Vec3::new(5.0, 0.0, 5.0));
        let target = Vec3::new(-3.0, 2.0, 1.0);
        cam.look_at(target);

        let expected = (target - cam.position()).normalize();
        assert!((cam.front() - expected).length() < 1e-4);
    }

    #[test]
    fn look_at_own_position_is_ignored() {
        let mut cam = Camera::default();
        let before = cam.clone();
        cam.look_at(cam.position());
        assert_eq!(cam, before);
    }

    // ── projection ───────────────────────────────────────────────────────

    #[test]
    fn point_ahead_projects_to_viewport_centre() {
        let cam = Camera::default();
        let (proj, view) = matrices(&cam);
        let p = cam
            .world_to_screen(Vec3::new(0.0, 0.0, -10.0), proj, view, viewport())
            .position()
            .unwrap();
        assert!((p - Vec2::new(640.0, 360.0)).length() < 1e-3);
    }

    #[test]
    fn point_above_projects_to_upper_half() {
        let cam = Camera::default();
        let (proj, view) = matrices(&cam);
        let p = cam
            .world_to_screen(Vec3::new(0.0, 2.0, -10.0), proj, view, viewport())
            .to_vec2();
        assert!(p.y < 360.0);
    }

    #[test]
    fn points_behind_eye_are_invalid() {
        let cam = Camera::default();
        let (proj, view) = matrices(&cam);
        for z in [1.0, 2.0, 50.0] {
            let sp = cam.world_to_screen(Vec3::new(0.3, -0.2, z), proj, view, viewport());
            assert_eq!(sp, ScreenPoint::Invalid);
            assert_eq!(sp.to_vec2(), ScreenPoint::INVALID_COORD);
        }
    }

    #[test]
    fn screen_ray_passes_through_projected_point() {
        let mut cam = Camera::new(Vec3::new(1.0, 2.0, 3.0), -60.0, -15.0, CameraSettings::default());
        cam.apply_mouse_delta(12.0, 4.0, true);
        let (proj, view) = matrices(&cam);

        for world in [
            Vec3::new(4.0, 0.0, -6.0),
            Vec3::new(2.0, 1.0, -2.0),
            Vec3::new(6.0, -3.0, -20.0),
        ] {
            let Some(screen) = cam.world_to_screen(world, proj, view, viewport()).position()
            else {
                continue;
            };
            let ray = cam.screen_to_world_ray(screen, proj, view, viewport()).unwrap();

            // Distance from `world` to the ray's line, relative to its depth.
            let to_point = world - ray.origin;
            let along = to_point.dot(ray.direction);
            let off_axis = (to_point - ray.direction * along).length();
            assert!(along > 0.0);
            assert!(off_axis / along < 1e-3, "world {world:?} off by {off_axis}");
        }
    }

    #[test]
    fn screen_ray_needs_valid_viewport() {
        let cam = Camera::default();
        let (proj, view) = matrices(&cam);
        let vp = Viewport::from_size(0, 0);
        assert!(cam.screen_to_world_ray(Vec2::ZERO, proj, view, vp).is_none());
    }
}
