//! Models: one geometry split into per-material meshes.

use glam::{Mat4, Vec3};
use strata_math::{Ray, ray_triangle_intersection};

use crate::{Geometry, Mesh};

/// A renderable model as delivered by the loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    geometry: Geometry,
    meshes: Vec<Mesh>,
    bounding_radius: f32,
    bone_count: usize,
}

impl Model {
    /// Builds a model and computes its bounding radius (the furthest vertex
    /// from the model-space origin).
    pub fn new(geometry: Geometry, meshes: Vec<Mesh>) -> Self {
        let bounding_radius = geometry
            .positions()
            .iter()
            .map(|p| p.length())
            .fold(0.0_f32, f32::max);
        Self {
            geometry,
            meshes,
            bounding_radius,
            bone_count: 0,
        }
    }

    /// Declares a skeleton with `bone_count` bones.
    pub fn with_bones(mut self, bone_count: usize) -> Self {
        self.bone_count = bone_count;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Exact ray test against every triangle of every mesh, placed in the
    /// world by `matrix` with a uniform `scale` applied in model space.
    ///
    /// Returns the nearest hit distance along `ray`.
    pub fn cast_ray(&self, ray: &Ray, matrix: &Mat4, scale: f32) -> Option<f32> {
        let to_world = *matrix * Mat4::from_scale(Vec3::splat(scale));
        self.meshes
            .iter()
            .flat_map(|mesh| self.geometry.triangles(mesh.first_index, mesh.index_count))
            .filter_map(|[a, b, c]| {
                ray_triangle_intersection(
                    ray,
                    to_world.transform_point3(a),
                    to_world.transform_point3(b),
                    to_world.transform_point3(c),
                )
            })
            .min_by(f32::total_cmp)
    }
}
