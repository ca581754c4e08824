//! Ray-triangle intersection.
//!
//! Uses the Möller-Trumbore algorithm. Shared by the full-frame ray tracer
//! and by single-ray picking.

use crate::{DVec3, Ray};

/// Tolerance for the parallel test and the minimum accepted ray parameter.
pub const INTERSECT_EPSILON: f64 = 1e-7;

/// A ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Intersection point in world space
    pub point: DVec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Barycentric weight of the second vertex
    pub u: f64,
    /// Barycentric weight of the third vertex
    pub v: f64,
}

/// Intersect `ray` with the triangle `(a, b, c)`.
///
/// Returns `None` when the ray is parallel to the triangle plane (which
/// includes every degenerate triangle), misses the triangle, or only meets
/// it at or behind the origin.
pub fn intersect_triangle(ray: &Ray, a: DVec3, b: DVec3, c: DVec3) -> Option<TriangleHit> {
    let edge1 = b - a;
    let edge2 = c - a;

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);

    // Ray is parallel to triangle
    if det.abs() < INTERSECT_EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin - a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t <= INTERSECT_EPSILON {
        return None;
    }

    Some(TriangleHit {
        point: ray.at(t),
        t,
        u,
        v,
    })
}

/// Convenience form of [`intersect_triangle`] returning only the point.
pub fn ray_intersects_triangle(
    origin: DVec3,
    direction: DVec3,
    a: DVec3,
    b: DVec3,
    c: DVec3,
) -> Option<DVec3> {
    intersect_triangle(&Ray::new(origin, direction), a, b, c).map(|hit| hit.point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (DVec3, DVec3, DVec3) {
        (
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_hit_through_known_point() {
        let (a, b, c) = unit_triangle();
        let origin = DVec3::new(0.0, 0.0, 10.0);
        let target = DVec3::new(0.01, 0.2, 0.0);

        let hit = ray_intersects_triangle(origin, target - origin, a, b, c)
            .expect("ray should hit the triangle");

        assert!(hit.z.abs() < 1e-6);
        assert!((hit.x - 0.01).abs() < 1e-6);
        assert!((hit.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_hit_lies_on_plane_with_valid_barycentrics() {
        let a = DVec3::new(-1.0, -0.5, 2.0);
        let b = DVec3::new(2.0, 0.0, 3.0);
        let c = DVec3::new(0.0, 2.0, 1.0);
        let normal = (b - a).cross(c - a).normalize();

        let origins = [
            DVec3::new(0.0, 0.0, -5.0),
            DVec3::new(3.0, 1.0, 10.0),
            DVec3::new(-4.0, 2.0, 0.0),
        ];
        let targets = [
            a * 0.2 + b * 0.3 + c * 0.5,
            a * 0.6 + b * 0.2 + c * 0.2,
            a * 0.1 + b * 0.1 + c * 0.8,
        ];

        for origin in origins {
            for target in targets {
                let ray = Ray::through(origin, target);
                let hit = intersect_triangle(&ray, a, b, c).expect("should hit");

                assert!(normal.dot(hit.point - a).abs() < 1e-9);
                let w0 = 1.0 - hit.u - hit.v;
                assert!(hit.u >= 0.0 && hit.v >= 0.0 && w0 >= -1e-12);
                assert!((w0 + hit.u + hit.v - 1.0).abs() < 1e-12);
                assert!((hit.point - target).length() < 1e-9);
            }
        }
    }

    #[test]
    fn test_miss_outside_triangle() {
        let (a, b, c) = unit_triangle();
        let origin = DVec3::new(0.0, 0.0, 10.0);
        let target = DVec3::new(0.8, 0.8, 0.0);

        assert!(ray_intersects_triangle(origin, target - origin, a, b, c).is_none());
    }

    #[test]
    fn test_miss_behind_origin() {
        let (a, b, c) = unit_triangle();
        // Pointing away from the triangle
        let ray = Ray::new(DVec3::new(0.2, 0.2, 10.0), DVec3::Z);

        assert!(intersect_triangle(&ray, a, b, c).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let (a, b, c) = unit_triangle();
        let ray = Ray::new(DVec3::new(-1.0, 0.2, 0.0), DVec3::X);

        assert!(intersect_triangle(&ray, a, b, c).is_none());
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let a = DVec3::new(0.0, 0.0, 0.0);
        let b = DVec3::new(1.0, 1.0, 0.0);
        let c = DVec3::new(2.0, 2.0, 0.0);

        let origins = [DVec3::new(1.0, 1.0, 5.0), DVec3::new(0.0, 3.0, -2.0)];
        for origin in origins {
            let ray = Ray::through(origin, DVec3::new(1.0, 1.0, 0.0));
            assert!(intersect_triangle(&ray, a, b, c).is_none());
        }
    }
}
