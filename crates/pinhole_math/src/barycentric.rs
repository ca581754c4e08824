//! Screen-space barycentric coordinates.
//!
//! A triangle's projected vertices give four coefficients that turn every
//! later per-pixel weight query into a couple of multiply-adds. The cache
//! only describes the projection it was built from and must be rebuilt
//! whenever the camera or the vertices move.

use crate::DVec2;

/// Determinants below this magnitude mark a triangle as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Cached barycentric coefficients of a projected triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    /// (y1 - y2) / det
    a: f64,
    /// (x2 - x1) / det
    b: f64,
    /// (y2 - y0) / det
    c: f64,
    /// (x0 - x2) / det
    d: f64,
    /// Third vertex, the origin of the coefficient form
    origin: DVec2,
}

impl Barycentric {
    /// Build the coefficients for the screen-space triangle `(p0, p1, p2)`.
    ///
    /// Returns `None` for zero-area (collinear or coincident) triangles.
    pub fn from_screen(p0: DVec2, p1: DVec2, p2: DVec2) -> Option<Self> {
        let det = (p1.y - p2.y) * (p0.x - p2.x) + (p2.x - p1.x) * (p0.y - p2.y);
        if !det.is_finite() || det.abs() < DEGENERATE_EPSILON {
            return None;
        }

        let inv = 1.0 / det;
        Some(Self {
            a: (p1.y - p2.y) * inv,
            b: (p2.x - p1.x) * inv,
            c: (p2.y - p0.y) * inv,
            d: (p0.x - p2.x) * inv,
            origin: p2,
        })
    }

    /// Raw weights at `(x, y)`. They sum to 1 but may be negative outside
    /// the triangle.
    pub fn raw_weights(&self, x: f64, y: f64) -> [f64; 3] {
        let dx = x - self.origin.x;
        let dy = y - self.origin.y;
        let w0 = self.a * dx + self.b * dy;
        let w1 = self.c * dx + self.d * dy;
        [w0, w1, 1.0 - w0 - w1]
    }

    /// Weights at `(x, y)` with negative components clamped to zero and the
    /// rest renormalized to sum to 1.
    ///
    /// Pixels on a rasterized edge can land slightly outside the exact
    /// triangle; this keeps their interpolated attributes inside the
    /// vertex range.
    pub fn weights(&self, x: f64, y: f64) -> [f64; 3] {
        let mut w = self.raw_weights(x, y);
        if w.iter().all(|&wi| wi >= 0.0) {
            return w;
        }

        for wi in &mut w {
            *wi = wi.max(0.0);
        }
        let sum: f64 = w.iter().sum();
        if sum > 0.0 {
            for wi in &mut w {
                *wi /= sum;
            }
            w
        } else {
            // Unreachable for finite input since raw weights sum to 1
            [1.0 / 3.0; 3]
        }
    }

    /// Interpolate three scalar attributes at `(x, y)`.
    pub fn interpolate(&self, x: f64, y: f64, values: [f64; 3]) -> f64 {
        let w = self.weights(x, y);
        w[0] * values[0] + w[1] * values[1] + w[2] * values[2]
    }
}
