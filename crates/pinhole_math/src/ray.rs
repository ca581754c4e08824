use crate::DVec3;

/// A ray in 3D space.
///
/// The direction is not required to be normalized: camera rays are built
/// from pixel offsets and keep the length that produces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Create the ray that starts at `origin` and passes through `target`
    /// at parameter 1.
    pub fn through(origin: DVec3, target: DVec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}
