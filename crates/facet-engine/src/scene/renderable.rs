use std::fmt;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::collision::RayIntersector;
use super::model::Model;
use crate::render::PipelineManager;
use crate::resource::GpuHandle;

/// Stable identifier assigned by [`Scene::add`](super::Scene::add).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RenderableId(pub(crate) u32);

impl fmt::Display for RenderableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    PipelineNotFound(String),
    UnknownRenderable(RenderableId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::PipelineNotFound(name) => write!(f, "pipeline '{name}' not found"),
            SceneError::UnknownRenderable(id) => write!(f, "no renderable {id}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// World position with its translation matrix kept in sync.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    position: Vec3,
    world: Mat4,
}

impl Placement {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            world: Mat4::from_translation(position),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.world = Mat4::from_translation(position);
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Runs a world-space segment query against geometry defined in local
    /// space and returns the hit in world space.
    pub fn intersect(
        &self,
        geometry: &dyn RayIntersector,
        origin: Vec3,
        destination: Vec3,
    ) -> Option<Vec3> {
        let to_local = self.world.inverse();
        geometry
            .intersect_segment(
                to_local.transform_point3(origin),
                to_local.transform_point3(destination),
            )
            .map(|hit| self.world.transform_point3(hit))
    }
}

/// Per-renderable matrices, group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// A model placed in the world, drawn with a named pipeline.
#[derive(Debug)]
pub struct Renderable {
    name: String,
    model: Arc<Model>,
    placement: Placement,
    pipeline_name: String,
    pipeline: GpuHandle<wgpu::RenderPipeline>,
    transform: GpuHandle<wgpu::Buffer>,
    bind_group: wgpu::BindGroup,
}

impl Renderable {
    /// Fails when `pipeline` has not been created on `pipelines`.
    pub fn new(
        device: &wgpu::Device,
        pipelines: &PipelineManager,
        pipeline: &str,
        model: Arc<Model>,
        position: Vec3,
        name: Option<&str>,
    ) -> Result<Self, SceneError> {
        let handle = pipelines
            .get_pipeline(pipeline)
            .ok_or_else(|| SceneError::PipelineNotFound(pipeline.to_owned()))?;

        let name = name.unwrap_or_else(|| model.name()).to_owned();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&name),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&name),
            layout: &pipelines.layouts().transform,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            transform: GpuHandle::new(format!("{name} transform"), buffer),
            name,
            model,
            placement: Placement::new(position),
            pipeline_name: pipeline.to_owned(),
            pipeline: handle,
            bind_group,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn position(&self) -> Vec3 {
        self.placement.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.placement.set_position(position);
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn intersect(&self, origin: Vec3, destination: Vec3) -> Option<Vec3> {
        self.placement
            .intersect(self.model.collision(), origin, destination)
    }

    /// Stages this frame's matrices. Must precede the draw in the same frame.
    pub fn write_transform(&self, queue: &wgpu::Queue, view: Mat4, projection: Mat4) {
        let uniform = TransformUniform::new(self.placement.world_matrix(), view, projection);
        queue.write_buffer(&self.transform, 0, bytemuck::bytes_of(&uniform));
    }

    /// Binds pipeline and transform (group 0) and draws every mesh. The light
    /// (group 1) must already be bound.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        self.model.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::collision::CollisionMesh;

    fn unit_triangle() -> CollisionMesh {
        // Facing +z at local z = 0.
        CollisionMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        )
    }

    // ── placement ────────────────────────────────────────────────────────

    #[test]
    fn set_position_round_trips_exactly() {
        let mut p = Placement::new(Vec3::new(1.0, 2.0, 3.0));
        let q = Vec3::new(-7.25, 0.5, 1e6);
        p.set_position(q);
        assert_eq!(p.position(), q);
    }

    #[test]
    fn world_matrix_follows_position() {
        let mut p = Placement::new(Vec3::new(1.0, 2.0, 3.0));
        let q = Vec3::new(4.0, -5.0, 6.0);
        p.set_position(q);
        assert_eq!(p.world_matrix(), Mat4::from_translation(q));
        assert_eq!(p.world_matrix().transform_point3(Vec3::ZERO), q);
    }

    #[test]
    fn intersect_happens_in_local_space() {
        let p = Placement::new(Vec3::new(10.0, 0.0, 5.0));
        let hit = p
            .intersect(
                &unit_triangle(),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 20.0),
            )
            .unwrap();
        assert!((hit - Vec3::new(10.0, 0.0, 5.0)).length() < 1e-5);

        // The untranslated location is empty.
        assert!(p
            .intersect(&unit_triangle(), Vec3::ZERO, Vec3::new(0.0, 0.0, 20.0))
            .is_none());
    }

    // ── uniform ──────────────────────────────────────────────────────────

    #[test]
    fn transform_uniform_is_column_major() {
        let t = Vec3::new(1.0, 2.0, 3.0);
        let u = TransformUniform::new(Mat4::from_translation(t), Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<TransformUniform>(), 192);
    }

    #[test]
    fn scene_error_messages() {
        assert_eq!(
            SceneError::PipelineNotFound("wire".into()).to_string(),
            "pipeline 'wire' not found"
        );
        assert_eq!(
            SceneError::UnknownRenderable(RenderableId(3)).to_string(),
            "no renderable #3"
        );
    }
}
