//! Rays and ray intersection tests.

use glam::Vec3;

use crate::aabb::Aabb;

/// Ray with an origin and a direction.
///
/// The direction does not need to be normalized for box intersection tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    /// Origin of the ray.
    pub origin: Vec3,
    /// Direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Constructs a ray from an origin and a direction.
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at distance `t` along the ray.
    pub fn extrapolate(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Returns `true` if the ray intersects the box.
    ///
    /// Slab test. Zero direction components produce infinite slab distances
    /// that compare correctly; a ray grazing exactly along a box face may
    /// report a miss.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let inv = self.direction.recip();
        let t0 = (aabb.min - self.origin) * inv;
        let t1 = (aabb.max - self.origin) * inv;
        let t_min = t0.min(t1);
        let t_max = t0.max(t1);
        let t_enter = t_min.max_element().max(0.0);
        let t_exit = t_max.min_element();
        t_enter <= t_exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_box() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_ray_misses_box() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 3.0, -5.0), Vec3::Z);
        assert!(!ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_ray_pointing_away() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_ray_origin_inside_box() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_axis_aligned_ray() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::X);
        assert!(ray.intersects_aabb(&aabb));
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.5), Vec3::X);
        assert!(!ray.intersects_aabb(&aabb));
    }
}
