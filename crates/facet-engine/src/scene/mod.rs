//! Scene content: geometry, materials, camera, lighting and placement.

pub mod camera;
pub mod collision;
pub mod light;
pub mod material;
pub mod mesh;
pub mod model;
pub mod renderable;
pub mod texture;
pub mod vertex;
mod world;

pub use camera::{Camera, CameraSettings, Movement};
pub use collision::{CollisionMesh, Ray, RayIntersector};
pub use light::{LightData, LightKind, LightUniform};
pub use material::{Material, MaterialConstants, MaterialDefaults};
pub use mesh::Mesh;
pub use model::{Model, UploadContext};
pub use renderable::{Placement, Renderable, RenderableId, SceneError, TransformUniform};
pub use texture::{Texture, TextureCache};
pub use vertex::Vertex;
pub use world::Scene;
