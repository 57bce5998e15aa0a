use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::{DecodeError, DecodedImage};
use crate::resource::GpuHandle;

/// Sampled 2D color texture.
#[derive(Debug)]
pub struct Texture {
    view: wgpu::TextureView,
    texture: GpuHandle<wgpu::Texture>,
    width: u32,
    height: u32,
}

impl Texture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Uploads a decoded image. Images larger than the device's 2D texture
    /// limit are rejected so the material keeps its constant color.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: DecodedImage,
        path: &Path,
    ) -> Result<Self, DecodeError> {
        check_extent(path, image.width, image.height, device.limits().max_texture_dimension_2d)?;
        let image = image.into_top_down();
        Ok(Self::from_rgba(
            device,
            queue,
            image.width,
            image.height,
            &image.pixels,
            &path.to_string_lossy(),
        ))
    }

    /// 1x1 opaque white, bound when a material has no texture.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, 1, 1, &[255; 4], "white fallback")
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            texture: GpuHandle::new(label, texture),
            width,
            height,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn label(&self) -> &str {
        self.texture.label()
    }
}

fn check_extent(path: &Path, width: u32, height: u32, max: u32) -> Result<(), DecodeError> {
    if width > max || height > max {
        return Err(DecodeError::new(
            path,
            format!("{width}x{height} exceeds the device texture limit of {max}"),
        ));
    }
    Ok(())
}

/// Path-keyed cache so materials referencing the same file share one
/// texture. Failed loads are remembered and not retried.
#[derive(Debug)]
pub struct TextureCache<T> {
    entries: HashMap<PathBuf, Option<Arc<T>>>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<E: std::fmt::Display>(
        &mut self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<T, E>,
    ) -> Option<Arc<T>> {
        if let Some(entry) = self.entries.get(path) {
            return entry.clone();
        }

        let entry = match load(path) {
            Ok(t) => Some(Arc::new(t)),
            Err(e) => {
                log::warn!("texture unavailable, using material color: {e}");
                None
            }
        };
        self.entries.insert(path.to_path_buf(), entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // ── extent ────────────────────────────────────────────────────────────

    #[test]
    fn extent_within_limit_is_accepted() {
        assert!(check_extent(Path::new("a.png"), 8192, 8192, 8192).is_ok());
        assert!(check_extent(Path::new("a.png"), 1, 1, 8192).is_ok());
    }

    #[test]
    fn oversized_extent_is_a_decode_error() {
        let err = check_extent(Path::new("huge.png"), 16384, 4, 8192).unwrap_err();
        assert_eq!(err.path, Path::new("huge.png"));
        assert!(err.message.contains("16384x4"));
        assert!(check_extent(Path::new("tall.png"), 4, 8193, 8192).is_err());
    }

    #[test]
    fn oversized_texture_falls_back_in_cache() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let loaded = cache.get_or_load(Path::new("huge.png"), |p| {
            check_extent(p, 20000, 20000, 8192).map(|()| 1)
        });
        assert!(loaded.is_none());
        assert_eq!(cache.len(), 1);
    }

    // ── cache ─────────────────────────────────────────────────────────────

    #[test]
    fn same_path_loads_once_and_shares() {
        let mut cache = TextureCache::new();
        let calls = Cell::new(0);
        let load = |_: &Path| -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        let a = cache.get_or_load(Path::new("a.png"), load).unwrap();
        let b = cache.get_or_load(Path::new("a.png"), load).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failures_are_cached() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let calls = Cell::new(0);
        let load = |_: &Path| -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Err("missing".into())
        };

        assert!(cache.get_or_load(Path::new("gone.png"), load).is_none());
        assert!(cache.get_or_load(Path::new("gone.png"), load).is_none());
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_are_distinct_entries() {
        let mut cache = TextureCache::new();
        let a = cache.get_or_load(Path::new("a.png"), |_| Ok::<_, String>(1));
        let b = cache.get_or_load(Path::new("b.png"), |_| Ok::<_, String>(2));
        assert_eq!(a.as_deref(), Some(&1));
        assert_eq!(b.as_deref(), Some(&2));
    }
}
