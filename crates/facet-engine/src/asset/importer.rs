use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use glam::Vec3;

use super::error::ImportError;
use crate::scene::vertex::{Vertex, VertexKey};

/// Material parameters as read from a material library.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// Resolved against the geometry file's directory.
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for MaterialRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.0; 3],
            diffuse: [0.8; 3],
            specular: [0.0; 3],
            shininess: 1.0,
            diffuse_texture: None,
        }
    }
}

/// Triangle indices drawn with a single material.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexGroup {
    /// Index into [`ImportedGeometry::materials`]; `None` uses the default material.
    pub material: Option<usize>,
    pub indices: Vec<u32>,
}

/// Deduplicated geometry, one index group per material, ordered by material id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedGeometry {
    pub source: PathBuf,
    pub vertices: Vec<Vertex>,
    pub groups: Vec<IndexGroup>,
    pub materials: Vec<MaterialRecord>,
}

impl ImportedGeometry {
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.indices.len() / 3).sum()
    }
}

/// Reads a geometry file into deduplicated, triangulated geometry.
pub trait GeometryImporter {
    fn load(&self, path: &Path) -> Result<ImportedGeometry, ImportError>;
}

/// Wavefront OBJ/MTL importer backed by `tobj`.
#[derive(Debug, Default, Copy, Clone)]
pub struct TobjImporter;

impl GeometryImporter for TobjImporter {
    fn load(&self, path: &Path) -> Result<ImportedGeometry, ImportError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, materials) =
            tobj::load_obj(path, &options).map_err(|e| ImportError::new(path, e.to_string()))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("{}: material library not loaded: {e}", path.display());
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let records: Vec<MaterialRecord> = materials
            .iter()
            .map(|m| material_record(m, base_dir))
            .collect();

        let mut builder = GeometryBuilder::default();
        for model in &models {
            let mesh = &model.mesh;
            let material = mesh.material_id.filter(|&id| id < records.len());

            for (face, tri) in mesh.indices.chunks_exact(3).enumerate() {
                let mut corners = [Corner::default(); 3];
                for (k, corner) in corners.iter_mut().enumerate() {
                    let i = face * 3 + k;
                    let pi = tri[k] as usize;

                    corner.position = read3(&mesh.positions, pi).ok_or_else(|| {
                        ImportError::new(
                            path,
                            format!("mesh '{}': position index {pi} out of range", model.name),
                        )
                    })?;

                    if !mesh.normals.is_empty() {
                        let ni = mesh.normal_indices.get(i).map_or(pi, |&n| n as usize);
                        corner.normal = read3(&mesh.normals, ni);
                    }
                    if !mesh.texcoords.is_empty() {
                        let ti = mesh.texcoord_indices.get(i).map_or(pi, |&t| t as usize);
                        corner.texcoord = mesh
                            .texcoords
                            .get(ti * 2..ti * 2 + 2)
                            .map(|uv| [uv[0], 1.0 - uv[1]]);
                    }
                }
                builder.push_triangle(material, corners);
            }
        }

        if builder.is_empty() {
            return Err(ImportError::new(path, "file contains no triangles"));
        }

        let geometry = builder.finish(path.to_path_buf(), records);
        log::debug!(
            "{}: {} vertices, {} triangles, {} materials",
            path.display(),
            geometry.vertices.len(),
            geometry.triangle_count(),
            geometry.materials.len()
        );
        Ok(geometry)
    }
}

fn material_record(m: &tobj::Material, base_dir: &Path) -> MaterialRecord {
    let defaults = MaterialRecord::default();
    MaterialRecord {
        name: m.name.clone(),
        ambient: m.ambient.unwrap_or(defaults.ambient),
        diffuse: m.diffuse.unwrap_or(defaults.diffuse),
        specular: m.specular.unwrap_or(defaults.specular),
        shininess: m.shininess.unwrap_or(defaults.shininess),
        diffuse_texture: m
            .diffuse_texture
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| base_dir.join(t)),
    }
}

fn read3(data: &[f32], index: usize) -> Option<[f32; 3]> {
    data.get(index * 3..index * 3 + 3).map(|v| [v[0], v[1], v[2]])
}

/// One triangle corner before deduplication.
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct Corner {
    pub position: [f32; 3],
    pub normal: Option<[f32; 3]>,
    pub texcoord: Option<[f32; 2]>,
}

/// Accumulates triangles into shared vertices.
///
/// Corners are merged when all vertex fields match bit for bit and they belong
/// to the same material group. Corners without a normal get one from the
/// area-weighted sum of their adjacent face normals.
#[derive(Debug, Default)]
pub(crate) struct GeometryBuilder {
    vertices: Vec<Vertex>,
    needs_normal: Vec<bool>,
    groups: BTreeMap<Option<usize>, Vec<u32>>,
    lookup: HashMap<(Option<usize>, bool, VertexKey), u32>,
}

impl GeometryBuilder {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn push_triangle(&mut self, material: Option<usize>, corners: [Corner; 3]) {
        for corner in corners {
            let index = self.intern(material, corner);
            self.groups.entry(material).or_default().push(index);
        }
    }

    fn intern(&mut self, material: Option<usize>, corner: Corner) -> u32 {
        let vertex = Vertex {
            position: corner.position,
            normal: corner.normal.unwrap_or([0.0; 3]),
            texcoord: corner.texcoord.unwrap_or([0.0; 2]),
        };
        let missing = corner.normal.is_none();

        let next = self.vertices.len() as u32;
        let index = *self
            .lookup
            .entry((material, missing, vertex.key()))
            .or_insert(next);

        if index == next {
            self.vertices.push(vertex);
            self.needs_normal.push(missing);
        }
        index
    }

    pub fn finish(mut self, source: PathBuf, materials: Vec<MaterialRecord>) -> ImportedGeometry {
        if self.needs_normal.iter().any(|&n| n) {
            self.fill_normals();
        }

        ImportedGeometry {
            source,
            vertices: self.vertices,
            groups: self
                .groups
                .into_iter()
                .map(|(material, indices)| IndexGroup { material, indices })
                .collect(),
            materials,
        }
    }

    fn fill_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];

        for indices in self.groups.values() {
            for tri in indices.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
                let p0 = Vec3::from(self.vertices[a].position);
                let p1 = Vec3::from(self.vertices[b].position);
                let p2 = Vec3::from(self.vertices[c].position);
                let face = (p1 - p0).cross(p2 - p0);
                for i in [a, b, c] {
                    sums[i] += face;
                }
            }
        }

        for ((vertex, sum), needs) in self.vertices.iter_mut().zip(sums).zip(&self.needs_normal) {
            if *needs {
                vertex.normal = sum.try_normalize().unwrap_or(Vec3::Y).into();
            }
        }
    }
}
