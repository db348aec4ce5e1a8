//! Ray intersection tests used by scene picking.

use glam::Vec3;

/// A half-line starting at `origin` travelling along `direction`.
///
/// `direction` is expected to be normalized; intersection distances are
/// reported in multiples of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersects a ray with a sphere.
///
/// Returns the parameter of the first intersection in front of the origin,
/// or the exit point when the origin is inside the sphere. `None` when the
/// ray misses or the sphere lies entirely behind the origin.
pub fn ray_sphere_intersection(center: Vec3, radius: f32, ray: &Ray) -> Option<f32> {
    let l = center - ray.origin;
    let tca = l.dot(ray.direction);
    let d2 = l.length_squared() - tca * tca;
    let r2 = radius * radius;
    if d2 > r2 {
        return None;
    }
    let thc = (r2 - d2).sqrt();
    let t0 = tca - thc;
    let t1 = tca + thc;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// Moller-Trumbore ray/triangle test. Both faces count as hits.
pub fn ray_triangle_intersection(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_in_front() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = ray_sphere_intersection(Vec3::new(0.0, 0.0, 10.0), 2.0, &ray).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(ray_sphere_intersection(Vec3::new(5.0, 0.0, 10.0), 2.0, &ray).is_none());
    }

    #[test]
    fn test_sphere_behind_origin() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(ray_sphere_intersection(Vec3::new(0.0, 0.0, -10.0), 2.0, &ray).is_none());
    }

    #[test]
    fn test_sphere_origin_inside_reports_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere_intersection(Vec3::ZERO, 3.0, &ray).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, -5.0), Vec3::Z);
        let t = ray_triangle_intersection(
            &ray,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert!((ray.at(t).z).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let ray = Ray::new(Vec3::new(0.9, 0.9, -5.0), Vec3::Z);
        let hit = ray_triangle_intersection(
            &ray,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X);
        let hit = ray_triangle_intersection(
            &ray,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }
}
