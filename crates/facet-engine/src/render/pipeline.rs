use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;

use crate::resource::GpuHandle;
use crate::scene::light::LightUniform;
use crate::scene::material::MaterialUniform;
use crate::scene::renderable::TransformUniform;
use crate::scene::vertex::Vertex;

/// Name-keyed pipeline storage. Inserting under an existing name replaces it.
#[derive(Debug)]
pub struct PipelineCache<P> {
    entries: HashMap<String, P>,
}

impl<P> Default for PipelineCache<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P> PipelineCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous pipeline stored under `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, pipeline: P) -> Option<P> {
        self.entries.insert(name.into(), pipeline)
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Pipeline compilation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineError {
    pub name: String,
    pub message: String,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to create pipeline '{}': {}", self.name, self.message)
    }
}

impl std::error::Error for PipelineError {}

/// Shader program for a scene pipeline.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    pub wgsl: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub cull_mode: Option<wgpu::Face>,
}

/// Attachment formats every scene pipeline is compiled against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// Bind group layouts shared by all scene pipelines.
///
/// Group 0: per-renderable transform. Group 1: light. Group 2: material
/// constants, diffuse texture and sampler.
#[derive(Debug)]
pub struct BindingLayouts {
    pub transform: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl BindingLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let transform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("facet transform bgl"),
            entries: &[uniform_entry::<TransformUniform>(0, wgpu::ShaderStages::VERTEX)],
        });

        let light = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("facet light bgl"),
            entries: &[uniform_entry::<LightUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("facet material bgl"),
            entries: &[
                uniform_entry::<MaterialUniform>(0, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            transform,
            light,
            material,
        }
    }
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

/// Compiles and stores named scene pipelines.
///
/// All pipelines share one layout and are built for the same
/// [`TargetFormats`], so any of them can draw into the frame targets.
pub struct PipelineManager {
    layouts: BindingLayouts,
    layout: wgpu::PipelineLayout,
    targets: TargetFormats,
    depth_stencil: wgpu::DepthStencilState,
    cache: PipelineCache<GpuHandle<wgpu::RenderPipeline>>,
}

impl PipelineManager {
    pub fn new(device: &wgpu::Device, targets: TargetFormats) -> Self {
        let layouts = BindingLayouts::new(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("facet scene pipeline layout"),
            bind_group_layouts: &[&layouts.transform, &layouts.light, &layouts.material],
            push_constant_ranges: &[],
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: targets.depth,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        Self {
            layouts,
            layout,
            targets,
            depth_stencil,
            cache: PipelineCache::new(),
        }
    }

    pub fn layouts(&self) -> &BindingLayouts {
        &self.layouts
    }

    pub fn targets(&self) -> TargetFormats {
        self.targets
    }

    /// Compiles `desc` and stores it under `name`.
    ///
    /// On failure the error is logged and returned, and any pipeline already
    /// stored under `name` stays in place.
    pub fn create_pipeline(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        desc: &PipelineDesc<'_>,
    ) -> Result<GpuHandle<wgpu::RenderPipeline>, PipelineError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.targets.color,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(self.depth_stencil.clone()),
            multisample: wgpu::MultisampleState {
                count: self.targets.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            let err = PipelineError {
                name: name.to_owned(),
                message: err.to_string(),
            };
            log::error!("{err}");
            return Err(err);
        }

        let handle = GpuHandle::new(name, pipeline);
        if self.cache.insert(name, handle.clone()).is_some() {
            log::info!("pipeline '{name}' replaced");
        } else {
            log::info!("pipeline '{name}' created");
        }
        Ok(handle)
    }

    pub fn get_pipeline(&self, name: &str) -> Option<GpuHandle<wgpu::RenderPipeline>> {
        self.cache.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_pipeline_is_retrievable() {
        let mut cache = PipelineCache::new();
        cache.insert("standard", 1u32);
        assert_eq!(cache.get("standard"), Some(&1));
        assert!(cache.contains("standard"));
    }

    #[test]
    fn unknown_name_is_none() {
        let mut cache = PipelineCache::new();
        cache.insert("standard", 1u32);
        assert_eq!(cache.get("wireframe"), None);
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut cache = PipelineCache::new();
        assert_eq!(cache.insert("debug", 1u32), None);
        assert_eq!(cache.insert("debug", 2u32), Some(1));
        assert_eq!(cache.get("debug"), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn names_lists_every_entry() {
        let mut cache = PipelineCache::new();
        cache.insert("a", ());
        cache.insert("b", ());
        let mut names: Vec<_> = cache.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn error_names_the_pipeline() {
        let err = PipelineError {
            name: "standard".into(),
            message: "bad entry point".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create pipeline 'standard': bad entry point"
        );
    }
}
