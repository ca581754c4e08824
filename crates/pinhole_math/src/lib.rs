// Re-export glam for convenience
pub use glam::*;

// Pinhole math types
mod barycentric;
mod intersect;
mod ray;

pub use barycentric::{Barycentric, DEGENERATE_EPSILON};
pub use intersect::{intersect_triangle, ray_intersects_triangle, TriangleHit, INTERSECT_EPSILON};
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_cross_is_right_handed() {
        assert_eq!(DVec3::X.cross(DVec3::Y), DVec3::Z);
        assert_eq!(DVec3::Y.cross(DVec3::Z), DVec3::X);
    }

    #[test]
    fn test_dvec3_operations() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, DVec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(a.distance_squared(b), 27.0);
    }
}
