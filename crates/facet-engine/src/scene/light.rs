use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Where light comes from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LightKind {
    /// Emitted from a point; attenuation-free.
    Point(Vec3),
    /// Parallel rays travelling along the given direction.
    Directional(Vec3),
}

/// Scene lighting, uploaded once per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightData {
    pub ambient: Vec3,
    pub kind: LightKind,
    pub color: Vec3,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            kind: LightKind::Directional(Vec3::new(-0.3, -1.0, -0.4)),
            color: Vec3::ONE,
        }
    }
}

impl LightData {
    pub fn to_uniform(&self) -> LightUniform {
        let position = match self.kind {
            LightKind::Point(p) => p.extend(1.0),
            LightKind::Directional(d) => d.normalize_or_zero().extend(0.0),
        };
        LightUniform {
            ambient: self.ambient.extend(0.0).to_array(),
            position: position.to_array(),
            color: self.color.extend(0.0).to_array(),
        }
    }
}

/// GPU layout of [`LightData`]. `position.w` is 1 for point lights and 0 for
/// directional ones, in which case `xyz` is the travel direction.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub position: [f32; 4],
    pub color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_sets_w_to_one() {
        let light = LightData {
            kind: LightKind::Point(Vec3::new(30.0, 30.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(light.to_uniform().position, [30.0, 30.0, 0.0, 1.0]);
    }

    #[test]
    fn directional_light_is_normalized_with_w_zero() {
        let light = LightData {
            kind: LightKind::Directional(Vec3::new(0.0, -4.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(light.to_uniform().position, [0.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_is_three_vec4s() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }
}
