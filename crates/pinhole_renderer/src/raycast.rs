//! Brute-force ray casting against every face of every mesh.

use pinhole_core::{Color, FaceRef, Mesh};
use pinhole_math::{intersect_triangle, DVec3, Ray};

/// Nearest face hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub face: FaceRef,
    /// World-space intersection point
    pub point: DVec3,
    /// Squared distance from the ray origin to `point`
    pub distance_squared: f64,
}

/// Find the face nearest to the ray origin.
///
/// Ties keep the first face in mesh and face order.
pub fn cast_ray(meshes: &[Mesh], ray: &Ray) -> Option<RayHit> {
    let mut nearest: Option<RayHit> = None;

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        for (face_index, face) in mesh.faces().iter().enumerate() {
            let [a, b, c] = mesh.face_positions(face);
            let Some(hit) = intersect_triangle(ray, a, b, c) else {
                continue;
            };

            let distance_squared = hit.point.distance_squared(ray.origin);
            if nearest.map_or(true, |n| distance_squared < n.distance_squared) {
                nearest = Some(RayHit {
                    face: FaceRef::new(mesh_index, face_index),
                    point: hit.point,
                    distance_squared,
                });
            }
        }
    }

    nearest
}

/// Color seen along `ray`: the nearest face's flat color, negated when it
/// is `highlight`, or `background` when nothing is hit.
pub fn trace_ray(
    meshes: &[Mesh],
    ray: &Ray,
    background: Color,
    highlight: Option<FaceRef>,
) -> Color {
    let Some(hit) = cast_ray(meshes, ray) else {
        return background;
    };
    let color = meshes[hit.face.mesh].faces()[hit.face.face].color;
    if highlight == Some(hit.face) {
        color.negate()
    } else {
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_at(z: f64, color: Color) -> Mesh {
        let positions = [
            DVec3::new(-1.0, -1.0, z),
            DVec3::new(1.0, -1.0, z),
            DVec3::new(1.0, 1.0, z),
            DVec3::new(-1.0, 1.0, z),
        ];
        Mesh::from_triangles("quad", &positions, &[[0, 1, 2], [0, 2, 3]], color).unwrap()
    }

    #[test]
    fn test_nearest_face_wins() {
        let meshes = vec![quad_at(5.0, Color::RED), quad_at(2.0, Color::GREEN)];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.1, 0.2, 1.0));

        let hit = cast_ray(&meshes, &ray).unwrap();
        assert_eq!(hit.face.mesh, 1);
        assert!((hit.point.z - 2.0).abs() < 1e-12);
        assert!((hit.distance_squared - hit.point.length_squared()).abs() < 1e-12);

        assert_eq!(trace_ray(&meshes, &ray, Color::BLACK, None), Color::GREEN);
    }

    #[test]
    fn test_miss_returns_background() {
        let meshes = vec![quad_at(5.0, Color::RED)];
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z);

        assert!(cast_ray(&meshes, &ray).is_none());
        assert_eq!(trace_ray(&meshes, &ray, Color::BLUE, None), Color::BLUE);
        assert!(cast_ray(&[], &ray).is_none());
    }

    #[test]
    fn test_highlight_negates() {
        let meshes = vec![quad_at(5.0, Color::RED)];
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.1, -0.1, 1.0));
        let hit = cast_ray(&meshes, &ray).unwrap();

        assert_eq!(
            trace_ray(&meshes, &ray, Color::BLACK, Some(hit.face)),
            Color::RED.negate()
        );
    }

    #[test]
    fn test_collinear_face_is_never_hit() {
        let positions = [
            DVec3::new(-1.0, 0.0, 3.0),
            DVec3::new(0.0, 0.0, 3.0),
            DVec3::new(1.0, 0.0, 3.0),
        ];
        let line = Mesh::from_triangles("line", &positions, &[[0, 1, 2]], Color::RED).unwrap();
        let meshes = vec![line];
        let ray = Ray::through(DVec3::ZERO, DVec3::new(0.0, 0.0, 3.0));
        assert!(cast_ray(&meshes, &ray).is_none());
    }
}
