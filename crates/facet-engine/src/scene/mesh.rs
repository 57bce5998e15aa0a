use std::sync::Arc;

use super::material::Material;
use crate::resource::GpuHandle;

/// One indexed draw: a range of geometry drawn with a single material.
///
/// Meshes of the same model share the model's vertex buffer.
#[derive(Debug)]
pub struct Mesh {
    vertices: GpuHandle<wgpu::Buffer>,
    indices: GpuHandle<wgpu::Buffer>,
    index_count: u32,
    material: Arc<Material>,
}

impl Mesh {
    pub fn new(
        vertices: GpuHandle<wgpu::Buffer>,
        indices: GpuHandle<wgpu::Buffer>,
        index_count: u32,
        material: Arc<Material>,
    ) -> Self {
        Self {
            vertices,
            indices,
            index_count,
            material,
        }
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.material.bind(pass);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
