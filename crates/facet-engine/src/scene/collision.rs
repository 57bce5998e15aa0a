use glam::Vec3;

/// Below this, a ray is treated as parallel to the triangle plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Half-line with a unit direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Segment queries against some triangle set.
pub trait RayIntersector {
    /// Closest point where the segment `origin -> destination` touches the
    /// geometry, or `None`.
    fn intersect_segment(&self, origin: Vec3, destination: Vec3) -> Option<Vec3>;
}

/// CPU copy of a model's triangles, grouped per mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    positions: Vec<Vec3>,
    groups: Vec<Vec<u32>>,
}

impl CollisionMesh {
    pub fn new(positions: Vec<Vec3>, groups: Vec<Vec<u32>>) -> Self {
        Self { positions, groups }
    }

    pub fn push_group(&mut self, indices: Vec<u32>) {
        self.groups.push(indices);
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.len() / 3).sum()
    }

    fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.groups.iter().flat_map(move |g| {
            g.chunks_exact(3).filter_map(move |tri| {
                let a = *self.positions.get(tri[0] as usize)?;
                let b = *self.positions.get(tri[1] as usize)?;
                let c = *self.positions.get(tri[2] as usize)?;
                Some([a, b, c])
            })
        })
    }
}

impl RayIntersector for CollisionMesh {
    fn intersect_segment(&self, origin: Vec3, destination: Vec3) -> Option<Vec3> {
        let delta = destination - origin;
        let length = delta.length();
        if length <= 0.0 {
            return None;
        }
        let ray = Ray {
            origin,
            direction: delta / length,
        };

        self.triangles()
            .filter_map(|[a, b, c]| ray_triangle(&ray, a, b, c))
            .filter(|&t| t <= length)
            .min_by(f32::total_cmp)
            .map(|t| ray.at(t))
    }
}

/// Möller–Trumbore. Returns the distance along `ray` for hits at t >= 0.
pub fn ray_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t >= 0.0).then_some(t)
}
