//! Spatial helpers shared by the terrain and scene crates: clamped box
//! distances and ray intersection tests.

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::{Ray, ray_sphere_intersection, ray_triangle_intersection};
