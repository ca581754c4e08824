//! Pinhole camera: world to screen projection and ray generation.
//!
//! The camera keeps a right-handed orthonormal basis (`right`, `up`,
//! `forward`) and precomputes everything a projection or a ray needs, so
//! both are a handful of dot products per call.
//!
//! Camera space has +X to the right, +Y up and +Z along the viewing
//! direction, so points in front of the camera have positive depth.
//! Screen space has its origin at the top-left pixel corner, +Y downwards,
//! and the vertical field of view spans the buffer height.

use pinhole_core::ScreenPoint;
use pinhole_math::{DVec3, Ray};
use thiserror::Error;

/// Depths closer to zero than this are clamped before the perspective
/// divide.
const MIN_DEPTH: f64 = 1e-9;

/// Rejected camera orientation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera forward vector has zero length")]
    DegenerateForward,

    #[error("Camera up vector is zero or parallel to forward")]
    DegenerateUp,
}

/// Orthonormal camera basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: DVec3,
    pub up: DVec3,
    pub forward: DVec3,
}

/// Pinhole camera for a `width` x `height` pixel buffer.
#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    fov: f64,

    position: DVec3,
    up_world: DVec3,
    basis: Basis,

    // Cached computed values (set by recompute())
    tx: f64,
    ty: f64,
    tz: f64,
    scale: f64,
    corner: DVec3,
}

impl Camera {
    /// Camera at the origin looking down -Z with +Y up.
    pub fn new(width: u32, height: u32, fov_degrees: f64) -> Self {
        let mut camera = Self {
            width,
            height,
            fov: fov_degrees.to_radians(),
            position: DVec3::ZERO,
            up_world: DVec3::Y,
            basis: Basis {
                right: DVec3::X,
                up: DVec3::Y,
                forward: DVec3::NEG_Z,
            },
            tx: 0.0,
            ty: 0.0,
            tz: 0.0,
            scale: 1.0,
            corner: DVec3::ZERO,
        };
        camera.recompute();
        camera
    }

    /// Place the camera at `position` looking along `forward`.
    ///
    /// `up` is the world up hint; `None` reuses the previous one. It need
    /// not be perpendicular to `forward`: the basis is re-orthogonalized as
    /// right = forward x up, up = right x forward. On error the camera is
    /// left unchanged.
    pub fn set(
        &mut self,
        position: DVec3,
        forward: DVec3,
        up: Option<DVec3>,
    ) -> Result<(), CameraError> {
        let forward = forward
            .try_normalize()
            .ok_or(CameraError::DegenerateForward)?;
        let up_world = up
            .unwrap_or(self.up_world)
            .try_normalize()
            .ok_or(CameraError::DegenerateUp)?;

        let right = forward
            .cross(up_world)
            .try_normalize()
            .ok_or(CameraError::DegenerateUp)?;
        let up = right.cross(forward).normalize();

        self.position = position;
        self.up_world = up_world;
        self.basis = Basis { right, up, forward };
        self.recompute();
        Ok(())
    }

    /// Change the buffer size the camera projects into.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.recompute();
    }

    /// Change the vertical field of view.
    pub fn set_fov(&mut self, fov_degrees: f64) {
        self.fov = fov_degrees.to_radians();
        self.recompute();
    }

    fn recompute(&mut self) {
        let Basis { right, up, forward } = self.basis;

        self.tx = -right.dot(self.position);
        self.ty = -up.dot(self.position);
        self.tz = -forward.dot(self.position);
        self.scale = 1.0 / (self.fov * 0.5).tan();

        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        self.corner = -right * half_w + up * half_h + forward * (half_h * self.scale);
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Transform a world point to camera space.
    #[inline]
    pub fn to_camera(&self, p: DVec3) -> DVec3 {
        let Basis { right, up, forward } = self.basis;
        DVec3::new(
            right.dot(p) + self.tx,
            up.dot(p) + self.ty,
            forward.dot(p) + self.tz,
        )
    }

    /// Project a world point. Returns the camera-space point and the
    /// screen point carrying the camera depth.
    ///
    /// Points behind the camera still project (mirrored); the clipper's
    /// near plane removes them.
    pub fn project(&self, p: DVec3) -> (DVec3, ScreenPoint) {
        let cam = self.to_camera(p);
        let z = if cam.z.abs() < MIN_DEPTH {
            MIN_DEPTH.copysign(cam.z)
        } else {
            cam.z
        };

        let ndc_x = self.scale * cam.x / z;
        let ndc_y = self.scale * cam.y / z;

        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let screen = ScreenPoint::new(half_w + ndc_x * half_h, half_h - ndc_y * half_h, cam.z);
        (cam, screen)
    }

    /// Direction of the ray leaving the camera through screen point
    /// `(sx, sy)`. Not normalized.
    pub fn ray_direction(&self, sx: f64, sy: f64) -> DVec3 {
        self.basis.right * sx - self.basis.up * sy + self.corner
    }

    /// Ray through the centre of pixel `(x, y)`.
    pub fn pixel_ray(&self, x: u32, y: u32) -> Ray {
        Ray::new(
            self.position,
            self.ray_direction(x as f64 + 0.5, y as f64 + 0.5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(basis: Basis) {
        for v in [basis.right, basis.up, basis.forward] {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
        assert!(basis.right.dot(basis.up).abs() < 1e-12);
        assert!(basis.right.dot(basis.forward).abs() < 1e-12);
        assert!(basis.up.dot(basis.forward).abs() < 1e-12);
        // Right-handed: right x up points back at the viewer
        assert!((basis.right.cross(basis.up) + basis.forward).length() < 1e-12);
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new(100, 100, 60.0);
        assert_eq!(camera.basis().forward, DVec3::NEG_Z);
        assert_orthonormal(camera.basis());
    }

    #[test]
    fn test_basis_orthonormal_with_skewed_up() {
        let mut camera = Camera::new(640, 480, 60.0);
        camera
            .set(
                DVec3::new(3.0, -2.0, 7.0),
                DVec3::new(1.0, 2.0, -3.0),
                Some(DVec3::new(0.3, 1.0, 0.8)),
            )
            .unwrap();

        let basis = camera.basis();
        assert_orthonormal(basis);
        assert!((basis.forward - DVec3::new(1.0, 2.0, -3.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_set_reuses_previous_up() {
        let mut camera = Camera::new(100, 100, 60.0);
        camera.set(DVec3::ZERO, DVec3::X, Some(DVec3::Z)).unwrap();
        camera.set(DVec3::ZERO, DVec3::Y, None).unwrap();

        // Up hint is still +Z, so the new up is +Z as well
        assert!((camera.basis().up - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_set_rejects_degenerate_input() {
        let mut camera = Camera::new(100, 100, 60.0);
        let before = camera.basis();

        assert_eq!(
            camera.set(DVec3::ZERO, DVec3::ZERO, None),
            Err(CameraError::DegenerateForward)
        );
        assert_eq!(
            camera.set(DVec3::ZERO, DVec3::Y, Some(DVec3::Y)),
            Err(CameraError::DegenerateUp)
        );
        assert_eq!(camera.basis(), before);
    }

    #[test]
    fn test_project_center_and_depth() {
        let mut camera = Camera::new(100, 100, 60.0);
        camera
            .set(DVec3::new(0.0, 0.0, -5.0), DVec3::Z, Some(DVec3::Y))
            .unwrap();

        let (cam, screen) = camera.project(DVec3::ZERO);
        assert!((cam - DVec3::new(0.0, 0.0, 5.0)).length() < 1e-12);
        assert!((screen.x - 50.0).abs() < 1e-9);
        assert!((screen.y - 50.0).abs() < 1e-9);
        assert!((screen.depth - 5.0).abs() < 1e-12);

        // World +Y is up on screen, i.e. smaller screen y
        let (_, above) = camera.project(DVec3::new(0.0, 1.0, 0.0));
        assert!(above.y < 50.0);
    }

    #[test]
    fn test_project_behind_camera_has_negative_depth() {
        let mut camera = Camera::new(100, 100, 60.0);
        camera.set(DVec3::ZERO, DVec3::Z, Some(DVec3::Y)).unwrap();

        let (_, screen) = camera.project(DVec3::new(0.0, 0.0, -3.0));
        assert!(screen.depth < 0.0);

        // On the camera plane: clamped, still finite
        let (_, screen) = camera.project(DVec3::new(1.0, 1.0, 0.0));
        assert!(screen.x.is_finite() && screen.y.is_finite());
    }

    #[test]
    fn test_ray_matches_projection() {
        let mut camera = Camera::new(160, 90, 50.0);
        camera
            .set(
                DVec3::new(2.0, 1.0, 4.0),
                DVec3::new(-2.0, -1.0, -4.0),
                Some(DVec3::Y),
            )
            .unwrap();

        for (sx, sy) in [(0.5, 0.5), (80.0, 45.0), (159.5, 10.25), (33.0, 88.0)] {
            let dir = camera.ray_direction(sx, sy);
            let point = camera.position() + dir * 3.7;
            let (_, screen) = camera.project(point);
            assert!((screen.x - sx).abs() < 1e-9, "x {} vs {}", screen.x, sx);
            assert!((screen.y - sy).abs() < 1e-9, "y {} vs {}", screen.y, sy);
        }
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new(100, 100, 90.0);
        let dir = camera.ray_direction(50.0, 50.0);
        assert!((dir.normalize() - DVec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_resize_recenters_projection() {
        let mut camera = Camera::new(100, 100, 60.0);
        camera.resize(200, 50);

        let (_, screen) = camera.project(DVec3::new(0.0, 0.0, -10.0));
        assert!((screen.x - 100.0).abs() < 1e-9);
        assert!((screen.y - 25.0).abs() < 1e-9);
    }
}
