use glam::{Vec2, Vec3};

/// Axis-aligned bounding box in f32 world space.
///
/// Invariant: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// The constructor enforces this by swapping components if needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corners. Components are sorted so that
    /// min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A flat square footprint on the X/Z plane starting at `min` with the
    /// given edge length. The Y extent is collapsed to `min.y`.
    pub fn square_xz(min: Vec3, size: f32) -> Self {
        Self {
            min,
            max: Vec3::new(min.x + size, min.y, min.z + size),
        }
    }

    /// Planar distance from `p` to the box footprint, ignoring Y.
    ///
    /// Zero when the point projects inside the footprint, otherwise the
    /// Euclidean distance to the nearest edge or corner.
    pub fn distance_xz(&self, p: Vec3) -> f32 {
        let p = Vec2::new(p.x, p.z);
        let min = Vec2::new(self.min.x, self.min.z);
        let max = Vec2::new(self.max.x, self.max.z);
        (p - p.clamp(min, max)).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_corners() {
        let aabb = Aabb::new(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 3.0, -5.0));
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 3.0, 5.0));
    }

    #[test]
    fn test_distance_xz_inside_is_zero() {
        let quad = Aabb::square_xz(Vec3::ZERO, 64.0);
        assert_eq!(quad.distance_xz(Vec3::new(10.0, 500.0, 60.0)), 0.0);
    }

    #[test]
    fn test_distance_xz_to_edge() {
        let quad = Aabb::square_xz(Vec3::ZERO, 64.0);
        assert_eq!(quad.distance_xz(Vec3::new(-6.0, 0.0, 32.0)), 6.0);
        assert_eq!(quad.distance_xz(Vec3::new(32.0, 0.0, 74.0)), 10.0);
    }

    #[test]
    fn test_distance_xz_to_corner() {
        let quad = Aabb::square_xz(Vec3::ZERO, 64.0);
        // 3-4-5 triangle off the max corner
        let d = quad.distance_xz(Vec3::new(67.0, -20.0, 68.0));
        assert!((d - 5.0).abs() < 1e-5);
    }
}
