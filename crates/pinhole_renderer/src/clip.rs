//! View-volume clipping of projected triangles.
//!
//! Clipping happens after projection, against the screen-space cuboid
//! spanned by the pixel buffer and the near/far depths. Each face is clipped
//! by the six planes in turn (Sutherland-Hodgman) and the resulting convex
//! polygon is fanned back into triangles for the rasterizer.

use pinhole_core::{RasterPos, ScreenPoint};
use pinhole_math::DVec3;

/// Upper bound on clipped polygon size: each plane adds at most one vertex
/// to a convex polygon.
pub const MAX_CLIP_VERTICES: usize = 3 + 6;

/// Plane indices for clarity
const PLANE_LEFT: usize = 0;
const PLANE_RIGHT: usize = 1;
const PLANE_TOP: usize = 2;
const PLANE_BOTTOM: usize = 3;
const PLANE_NEAR: usize = 4;
const PLANE_FAR: usize = 5;

/// A vertex produced while clipping: screen x/y plus camera depth.
///
/// Clip vertices are plain values scoped to one face and never alias mesh
/// vertices.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ClipVertex {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    fn to_vec(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    #[inline]
    fn from_vec(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Pixel containing this vertex.
    pub fn raster(&self) -> RasterPos {
        RasterPos::from_screen(self.x, self.y)
    }
}

impl From<ScreenPoint> for ClipVertex {
    fn from(p: ScreenPoint) -> Self {
        Self::new(p.x, p.y, p.depth)
    }
}

/// Fixed-capacity convex polygon living on the stack.
#[derive(Debug, Clone, Copy)]
pub struct ClipPolygon {
    points: [ClipVertex; MAX_CLIP_VERTICES],
    len: usize,
}

impl ClipPolygon {
    pub fn new() -> Self {
        Self {
            points: [ClipVertex::default(); MAX_CLIP_VERTICES],
            len: 0,
        }
    }

    pub fn from_triangle(triangle: [ClipVertex; 3]) -> Self {
        let mut polygon = Self::new();
        for p in triangle {
            polygon.push(p);
        }
        polygon
    }

    fn push(&mut self, p: ClipVertex) {
        // Only near-degenerate input can exceed the convex bound; dropping
        // the extra point keeps the polygon usable.
        debug_assert!(self.len < MAX_CLIP_VERTICES, "clip polygon overflow");
        if self.len < MAX_CLIP_VERTICES {
            self.points[self.len] = p;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        &self.points[..self.len]
    }

    /// Fan triangulation from the first vertex.
    pub fn triangles(&self) -> impl Iterator<Item = [ClipVertex; 3]> + '_ {
        let v = self.vertices();
        (1..v.len().saturating_sub(1)).map(move |i| [v[0], v[i], v[i + 1]])
    }
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self::new()
    }
}

/// One face of the clip cuboid.
#[derive(Debug, Clone, Copy)]
pub struct ClipPlane {
    /// Corners of the cuboid face, in order around it
    corners: [DVec3; 4],
    /// Outward unit normal
    normal: DVec3,
}

impl ClipPlane {
    pub fn new(corners: [DVec3; 4], normal: DVec3) -> Self {
        Self { corners, normal }
    }

    /// Points on the plane count as inside.
    #[inline]
    pub fn is_inside(&self, p: DVec3) -> bool {
        self.normal.dot(p - self.corners[0]) <= 0.0
    }

    /// Intersection of segment `a`-`b` with the plane.
    ///
    /// Only crossings strictly between the endpoints count: a segment that
    /// merely touches the plane at an endpoint yields `None`.
    pub fn intersect(&self, a: DVec3, b: DVec3) -> Option<DVec3> {
        let [c0, c1, c2, _] = self.corners;
        let mut n = (c1 - c0).cross(c2 - c0);
        if n.length_squared() == 0.0 {
            // Corners collapse on a one-pixel-wide buffer
            n = self.normal;
        }

        let ab = b - a;
        let denom = n.dot(ab);
        if denom == 0.0 {
            return None;
        }

        let t = n.dot(c0 - a) / denom;
        if t <= 0.0 || t >= 1.0 || !t.is_finite() {
            return None;
        }
        Some(a + ab * t)
    }
}

/// The screen-space clip volume: `(0, 0, near)` to `(width-1, height-1, far)`.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [ClipPlane; 6],
}

impl Frustum {
    pub fn new(width: u32, height: u32, near: f64, far: f64) -> Self {
        let x0 = 0.0;
        let y0 = 0.0;
        let x1 = width.saturating_sub(1) as f64;
        let y1 = height.saturating_sub(1) as f64;
        let (z0, z1) = (near, far);

        let corner = |x, y, z| DVec3::new(x, y, z);
        let mut planes = [ClipPlane::new([DVec3::ZERO; 4], DVec3::ZERO); 6];

        planes[PLANE_LEFT] = ClipPlane::new(
            [corner(x0, y0, z0), corner(x0, y1, z0), corner(x0, y1, z1), corner(x0, y0, z1)],
            DVec3::NEG_X,
        );
        planes[PLANE_RIGHT] = ClipPlane::new(
            [corner(x1, y0, z0), corner(x1, y0, z1), corner(x1, y1, z1), corner(x1, y1, z0)],
            DVec3::X,
        );
        planes[PLANE_TOP] = ClipPlane::new(
            [corner(x0, y0, z0), corner(x0, y0, z1), corner(x1, y0, z1), corner(x1, y0, z0)],
            DVec3::NEG_Y,
        );
        planes[PLANE_BOTTOM] = ClipPlane::new(
            [corner(x0, y1, z0), corner(x1, y1, z0), corner(x1, y1, z1), corner(x0, y1, z1)],
            DVec3::Y,
        );
        planes[PLANE_NEAR] = ClipPlane::new(
            [corner(x0, y0, z0), corner(x1, y0, z0), corner(x1, y1, z0), corner(x0, y1, z0)],
            DVec3::NEG_Z,
        );
        planes[PLANE_FAR] = ClipPlane::new(
            [corner(x0, y0, z1), corner(x0, y1, z1), corner(x1, y1, z1), corner(x1, y0, z1)],
            DVec3::Z,
        );

        Self { planes }
    }

    /// Clip a projected triangle.
    ///
    /// Returns an empty polygon when the triangle is entirely outside or
    /// only touches the volume at a vertex or along an edge, otherwise a
    /// convex polygon of 3 or more vertices in edge order.
    pub fn clip_triangle(&self, triangle: [ClipVertex; 3]) -> ClipPolygon {
        let mut polygon = ClipPolygon::from_triangle(triangle);

        for plane in &self.planes {
            let input = polygon.vertices();
            let n = input.len();
            let mut output = ClipPolygon::new();

            for i in 0..n {
                let prev = input[(i + n - 1) % n].to_vec();
                let current = input[i].to_vec();

                if plane.is_inside(prev) {
                    output.push(ClipVertex::from_vec(prev));
                }
                if let Some(p) = plane.intersect(prev, current) {
                    output.push(ClipVertex::from_vec(p));
                }
            }

            // A point or a segment left on the plane has no area
            if output.len() < 3 {
                return ClipPolygon::new();
            }
            polygon = output;
        }

        polygon
    }
}
