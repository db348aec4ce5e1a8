//! CPU-side geometry buffers and the index ranges that reference them.

use glam::Vec3;

use crate::MaterialHandle;

/// A position-only vertex/index buffer pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < positions.len()),
            "index out of range of the vertex buffer"
        );
        Self { positions, indices }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Raw vertex bytes, tightly packed as three f32 per vertex.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw index bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Iterates the triangles of the index range `[first, first + count)`.
    pub fn triangles(&self, first: u32, count: u32) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let start = (first as usize).min(self.indices.len());
        let end = (first as usize + count as usize).min(self.indices.len());
        self.indices[start..end]
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]].map(|i| self.positions[i as usize]))
    }
}

/// A drawable sub-range of a geometry bound to one material.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub material: Option<MaterialHandle>,
    pub first_index: u32,
    pub index_count: u32,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        material: Option<MaterialHandle>,
        first_index: u32,
        index_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            material,
            first_index,
            index_count,
        }
    }
}
