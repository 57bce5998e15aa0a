use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::collision::{CollisionMesh, RayIntersector};
use super::material::{Material, MaterialConstants, MaterialDefaults};
use super::mesh::Mesh;
use super::texture::{Texture, TextureCache};
use crate::asset::{GeometryImporter, ImageDecoder, ImportError, ImportedGeometry};
use crate::resource::GpuHandle;

/// Device access needed to upload models.
#[derive(Clone, Copy)]
pub struct UploadContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub material_layout: &'a wgpu::BindGroupLayout,
    pub material_defaults: &'a MaterialDefaults,
}

/// Loaded geometry: GPU meshes plus a CPU copy of the triangles for picking.
/// Immutable once built; share it between renderables with `Arc<Model>`.
#[derive(Debug)]
pub struct Model {
    name: String,
    meshes: Vec<Mesh>,
    collision: CollisionMesh,
}

impl Model {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>, collision: CollisionMesh) -> Self {
        Self {
            name: name.into(),
            meshes,
            collision,
        }
    }

    pub fn load(
        ctx: UploadContext<'_>,
        importer: &dyn GeometryImporter,
        decoder: &dyn ImageDecoder,
        path: &Path,
    ) -> Result<Self, ImportError> {
        let geometry = importer.load(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let model = Self::upload(ctx, decoder, &name, &geometry);
        log::info!(
            "model '{}' loaded: {} meshes, {} triangles",
            model.name,
            model.meshes.len(),
            model.collision.triangle_count()
        );
        Ok(model)
    }

    fn upload(
        ctx: UploadContext<'_>,
        decoder: &dyn ImageDecoder,
        name: &str,
        geometry: &ImportedGeometry,
    ) -> Self {
        let mut textures = TextureCache::new();
        let materials: Vec<Arc<Material>> = geometry
            .materials
            .iter()
            .map(|record| {
                let texture = record.diffuse_texture.as_deref().and_then(|path| {
                    textures.get_or_load(path, |p| {
                        decoder
                            .decode(p)
                            .and_then(|img| Texture::from_image(ctx.device, ctx.queue, img, p))
                    })
                });
                Arc::new(Material::new(
                    ctx.device,
                    ctx.material_layout,
                    ctx.material_defaults,
                    &record.name,
                    MaterialConstants::from_record(record),
                    texture,
                ))
            })
            .collect();

        let mut fallback: Option<Arc<Material>> = None;
        let mut default_material = || {
            fallback
                .get_or_insert_with(|| {
                    Arc::new(Material::new(
                        ctx.device,
                        ctx.material_layout,
                        ctx.material_defaults,
                        "default",
                        MaterialConstants::default(),
                        None,
                    ))
                })
                .clone()
        };

        let vertices = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(name),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let vertices = GpuHandle::new(format!("{name} vertices"), vertices);

        let mut collision = CollisionMesh::new(
            geometry.vertices.iter().map(|v| Vec3::from(v.position)).collect(),
            Vec::with_capacity(geometry.groups.len()),
        );

        let mut meshes = Vec::with_capacity(geometry.groups.len());
        for (i, group) in geometry.groups.iter().enumerate() {
            let material = match group.material.and_then(|m| materials.get(m)) {
                Some(m) => Arc::clone(m),
                None => default_material(),
            };

            let label = format!("{name} indices {i}");
            let indices = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&label),
                    contents: bytemuck::cast_slice(&group.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

            meshes.push(Mesh::new(
                vertices.clone(),
                GpuHandle::new(label, indices),
                group.indices.len() as u32,
                material,
            ));
            collision.push_group(group.indices.clone());
        }

        Self::new(name, meshes, collision)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn collision(&self) -> &CollisionMesh {
        &self.collision
    }

    /// Closest intersection of the segment with the model's triangles, in
    /// model space.
    pub fn intersect(&self, origin: Vec3, destination: Vec3) -> Option<Vec3> {
        self.collision.intersect_segment(origin, destination)
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for mesh in &self.meshes {
            mesh.draw(pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_model() -> Model {
        // Unit square in the XZ plane at y = 0.
        let positions = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        let collision = CollisionMesh::new(positions, vec![vec![0, 1, 2, 0, 2, 3]]);
        Model::new("floor", Vec::new(), collision)
    }

    #[test]
    fn intersect_uses_collision_geometry() {
        let model = floor_model();
        let hit = model
            .intersect(Vec3::new(0.5, 5.0, 0.5), Vec3::new(0.5, -5.0, 0.5))
            .unwrap();
        assert!((hit - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn segment_beside_model_misses() {
        let model = floor_model();
        assert!(model
            .intersect(Vec3::new(3.0, 5.0, 0.0), Vec3::new(3.0, -5.0, 0.0))
            .is_none());
    }

    #[test]
    fn cpu_only_model_has_no_meshes() {
        let model = floor_model();
        assert_eq!(model.name(), "floor");
        assert!(model.meshes().is_empty());
        assert_eq!(model.collision().triangle_count(), 2);
    }
}
