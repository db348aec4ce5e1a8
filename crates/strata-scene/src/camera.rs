//! Camera component.

use glam::{Mat4, Vec3};
use strata_math::Ray;

use crate::Entity;

/// Longest slot tag a camera can carry, in bytes.
pub const MAX_SLOT_LENGTH: usize = 30;

/// Perspective camera attached to an entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub(crate) entity: Entity,
    pub(crate) fov: f32,
    pub(crate) aspect: f32,
    pub(crate) near: f32,
    pub(crate) far: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) is_active: bool,
    pub(crate) slot: String,
}

impl Camera {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            fov: 60.0,
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 10_000.0,
            width: 800.0,
            height: 600.0,
            is_active: false,
            slot: String::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub(crate) fn set_slot(&mut self, slot: &str) {
        self.slot = truncate_slot(slot).to_string();
    }

    pub(crate) fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.aspect = width / height;
    }

    /// Right-handed OpenGL-style perspective projection.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov.to_radians(),
            self.width / self.height,
            self.near,
            self.far,
        )
    }

    /// World-space ray through screen pixel `(x, y)`, origin at the top-left
    /// corner of the viewport. `world` is the camera entity's matrix.
    pub fn screen_ray(&self, world: &Mat4, x: f32, y: f32) -> Ray {
        let nx = 2.0 * (x / self.width) - 1.0;
        let ny = 2.0 * ((self.height - y) / self.height) - 1.0;
        let view = world.inverse();
        let inverted = (self.projection_matrix() * view).inverse();
        let near = inverted.project_point3(Vec3::new(nx, ny, -1.0));
        let far = inverted.project_point3(Vec3::new(nx, ny, 1.0));
        Ray::new(world.w_axis.truncate(), (far - near).normalize())
    }
}

/// Cuts `slot` to at most [`MAX_SLOT_LENGTH`] bytes on a char boundary.
fn truncate_slot(slot: &str) -> &str {
    if slot.len() <= MAX_SLOT_LENGTH {
        return slot;
    }
    let mut end = MAX_SLOT_LENGTH;
    while !slot.is_char_boundary(end) {
        end -= 1;
    }
    &slot[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let camera = Camera::new(Entity(0));
        assert_eq!(camera.fov(), 60.0);
        assert_eq!(camera.width(), 800.0);
        assert_eq!(camera.height(), 600.0);
        assert_eq!(camera.near(), 0.1);
        assert_eq!(camera.far(), 10_000.0);
        assert!(!camera.is_active());
        assert_eq!(camera.slot(), "");
    }

    #[test]
    fn test_slot_truncation() {
        let mut camera = Camera::new(Entity(0));
        camera.set_slot("main");
        assert_eq!(camera.slot(), "main");
        camera.set_slot(&"x".repeat(40));
        assert_eq!(camera.slot().len(), MAX_SLOT_LENGTH);
        // 'é' is two bytes; 16 of them straddle the limit
        camera.set_slot(&"é".repeat(16));
        assert_eq!(camera.slot().len(), 30);
    }

    #[test]
    fn test_set_size_updates_aspect() {
        let mut camera = Camera::new(Entity(0));
        camera.set_size(1920.0, 1080.0);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_center_ray_looks_down_negative_z() {
        let camera = Camera::new(Entity(0));
        let world = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let ray = camera.screen_ray(&world, 400.0, 300.0);
        assert_eq!(ray.origin, Vec3::new(0.0, 5.0, 0.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_left_edge_ray_points_left() {
        let camera = Camera::new(Entity(0));
        let ray = camera.screen_ray(&Mat4::IDENTITY, 0.0, 300.0);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.z < 0.0);
        assert!(ray.direction.y.abs() < 1e-4);
    }

    #[test]
    fn test_projection_maps_near_plane() {
        let camera = Camera::new(Entity(0));
        let p = camera
            .projection_matrix()
            .project_point3(Vec3::new(0.0, 0.0, -camera.near()));
        assert!((p.z + 1.0).abs() < 1e-4);
    }
}
