use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use super::texture::Texture;
use crate::asset::MaterialRecord;
use crate::resource::GpuHandle;

/// Used when a material library leaves ambient at zero.
const DEFAULT_AMBIENT: f32 = 0.2;

/// Blinn-Phong surface constants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialConstants {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self::from_record(&MaterialRecord::default())
    }
}

impl MaterialConstants {
    pub fn from_record(record: &MaterialRecord) -> Self {
        let ambient = Vec3::from(record.ambient);
        Self {
            ambient: if ambient == Vec3::ZERO {
                Vec3::splat(DEFAULT_AMBIENT)
            } else {
                ambient
            },
            diffuse: Vec3::from(record.diffuse),
            specular: Vec3::from(record.specular),
            shininess: record.shininess,
        }
    }

    pub fn to_uniform(&self, has_texture: bool) -> MaterialUniform {
        MaterialUniform {
            ambient: self.ambient.extend(1.0).to_array(),
            diffuse: self.diffuse.extend(1.0).to_array(),
            specular: self.specular.extend(1.0).to_array(),
            shininess: self.shininess,
            has_texture: u32::from(has_texture),
            _pad: [0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    pub has_texture: u32,
    _pad: [u32; 2],
}

/// Shared resources every material binds: the white fallback texture and the
/// sampler.
#[derive(Debug)]
pub struct MaterialDefaults {
    fallback: Texture,
    sampler: GpuHandle<wgpu::Sampler>,
}

impl MaterialDefaults {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("facet material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            fallback: Texture::white(device, queue),
            sampler: GpuHandle::new("material sampler", sampler),
        }
    }
}

/// Immutable material: constants, optional shared texture, and the bind
/// group (group 2) exposing both to the fragment shader.
#[derive(Debug)]
pub struct Material {
    name: String,
    constants: MaterialConstants,
    texture: Option<Arc<Texture>>,
    bind_group: wgpu::BindGroup,
    _uniform: GpuHandle<wgpu::Buffer>,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        defaults: &MaterialDefaults,
        name: &str,
        constants: MaterialConstants,
        texture: Option<Arc<Texture>>,
    ) -> Self {
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: bytemuck::bytes_of(&constants.to_uniform(texture.is_some())),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let view = texture
            .as_deref()
            .map_or(defaults.fallback.view(), Texture::view);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&*defaults.sampler),
                },
            ],
        });

        Self {
            name: name.to_owned(),
            constants,
            texture,
            bind_group,
            _uniform: GpuHandle::new(format!("{name} constants"), uniform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &MaterialConstants {
        &self.constants
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(2, &self.bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ambient_gets_default() {
        let c = MaterialConstants::from_record(&MaterialRecord::default());
        assert_eq!(c.ambient, Vec3::splat(0.2));
    }

    #[test]
    fn explicit_ambient_is_kept() {
        let record = MaterialRecord {
            ambient: [0.5, 0.0, 0.0],
            ..Default::default()
        };
        let c = MaterialConstants::from_record(&record);
        assert_eq!(c.ambient, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn uniform_flags_texture_and_is_aligned() {
        let c = MaterialConstants::default();
        assert_eq!(c.to_uniform(true).has_texture, 1);
        assert_eq!(c.to_uniform(false).has_texture, 0);
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }
}
