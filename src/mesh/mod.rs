//! Heightfield triangulation with level-of-detail decimation

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rayon::prelude::*;

use crate::heightmap::HeightMap;
use crate::params::{Color, DrawMode, GenerationParams};

/// Interleaved vertex for GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Mesh buffers for one terrain (or one chunk).
///
/// Vertices are laid out row-major over the decimated grid:
/// vertex `(vx, vz)` lives at `vx + x_verts * vz`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub x_verts: usize,
    pub z_verts: usize,
    pub vertices: Vec<[f32; 3]>,
    /// Triples, counter-clockwise seen from +Y
    pub triangles: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex gradient colors for colored meshes
    pub colors: Option<Vec<Color>>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Interleave positions, normals and UVs
    pub fn to_interleaved(&self) -> Vec<TerrainVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| TerrainVertex {
                position,
                normal,
                uv,
            })
            .collect()
    }
}

/// Builds mesh buffers from a normalized height map
pub struct MeshBuilder;

impl MeshBuilder {
    /// Triangulate `height_map` using the stride, draw mode and elevation
    /// settings of `params`
    pub fn build(height_map: &HeightMap, params: &GenerationParams) -> MeshData {
        let width = height_map.width();
        let height = height_map.height();
        let inc = params.lod_stride();

        let x_verts = (width - 1) / inc + 1;
        let z_verts = (height - 1) / inc + 1;
        let vertex_count = x_verts * z_verts;

        let elevated = params.draw_mode == DrawMode::Mesh;

        let mut vertices = vec![[0.0f32; 3]; vertex_count];
        let mut uvs = vec![[0.0f32; 2]; vertex_count];

        vertices
            .par_chunks_mut(x_verts)
            .zip(uvs.par_chunks_mut(x_verts))
            .enumerate()
            .for_each(|(vz, (vertex_row, uv_row))| {
                let z = vz * inc;
                for (vx, (vertex, uv)) in vertex_row.iter_mut().zip(uv_row.iter_mut()).enumerate() {
                    let x = vx * inc;
                    let y = if elevated {
                        params.elevation_curve.evaluate(height_map.get(x, z)) * params.elevation_scale
                    } else {
                        0.0
                    };

                    *vertex = [x as f32, y, z as f32];
                    *uv = [x as f32 / width as f32, z as f32 / height as f32];
                }
            });

        let triangles = triangulate(x_verts, z_verts);
        let normals = compute_normals(&vertices, &triangles);

        let colors = (elevated && params.mesh_is_colored).then(|| {
            (0..vertex_count)
                .into_par_iter()
                .map(|i| {
                    let (vx, vz) = (i % x_verts, i / x_verts);
                    params.gradient.evaluate(height_map.get(vx * inc, vz * inc))
                })
                .collect::<Vec<Color>>()
        });

        log::trace!(
            "[MeshBuilder] {}x{} vertices (stride {}), {} triangles",
            x_verts,
            z_verts,
            inc,
            triangles.len() / 3
        );

        MeshData {
            x_verts,
            z_verts,
            vertices,
            triangles,
            uvs,
            normals,
            colors,
        }
    }
}

/// Two triangles per quad of the `x_verts` x `z_verts` vertex grid.
/// The last row and column only close quads.
pub fn triangulate(x_verts: usize, z_verts: usize) -> Vec<u32> {
    if x_verts < 2 || z_verts < 2 {
        return Vec::new();
    }

    let quads_per_row = x_verts - 1;
    let mut triangles = vec![0u32; quads_per_row * (z_verts - 1) * 6];

    triangles
        .par_chunks_mut(quads_per_row * 6)
        .enumerate()
        .for_each(|(vz, row)| {
            for (vx, quad) in row.chunks_exact_mut(6).enumerate() {
                let i = (vx + x_verts * vz) as u32;
                let below = i + x_verts as u32;

                quad.copy_from_slice(&[i, below, below + 1, i, below + 1, i + 1]);
            }
        });

    triangles
}

/// Area-weighted smooth normals; vertices without faces point up
pub fn compute_normals(vertices: &[[f32; 3]], triangles: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(vertices[a]);
        let pb = Vec3::from_array(vertices[b]);
        let pc = Vec3::from_array(vertices[c]);

        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y.to_array()
            } else {
                n.to_array()
            }
        })
        .collect()
}
