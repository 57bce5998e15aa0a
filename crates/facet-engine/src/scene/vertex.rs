use bytemuck::{Pod, Zeroable};

/// Interleaved mesh vertex as consumed by the scene shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Top-left origin.
    pub texcoord: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Bitwise identity of all fields, usable as a hash key.
    pub(crate) fn key(&self) -> VertexKey {
        let mut bits = [0u32; 8];
        let fields = self
            .position
            .iter()
            .chain(self.normal.iter())
            .chain(self.texcoord.iter());
        for (slot, v) in bits.iter_mut().zip(fields) {
            // -0.0 and 0.0 must dedup together.
            *slot = if *v == 0.0 { 0 } else { v.to_bits() };
        }
        VertexKey(bits)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct VertexKey([u32; 8]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn signed_zero_shares_a_key() {
        let a = Vertex {
            position: [0.0, 1.0, 2.0],
            ..Default::default()
        };
        let b = Vertex {
            position: [-0.0, 1.0, 2.0],
            ..Default::default()
        };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn differing_texcoord_changes_key() {
        let a = Vertex::default();
        let b = Vertex {
            texcoord: [0.0, 0.5],
            ..Default::default()
        };
        assert_ne!(a.key(), b.key());
    }
}
