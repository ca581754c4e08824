//! Scanline rasterization primitives.
//!
//! [`fill_triangle`] walks every pixel of a triangle and hands it to a
//! [`PixelVisitor`]. The same walk drives plain solid fills, the depth/face
//! buffer writer and the pick overlay; only the visitor changes.
//!
//! Line, outline and circle drawing for overlays live here as well.

use pinhole_core::{Color, RasterPos};

use crate::frame::FrameBuffers;

/// Per-pixel callback of the rasterizer.
pub trait PixelVisitor {
    /// Called once per covered pixel (a pixel on the split scanline of a
    /// general triangle may be visited twice).
    fn visit(&mut self, x: i32, y: i32);

    /// Optional `(width, height)` outside which pixels are never visited.
    fn clip_rect(&self) -> Option<(u32, u32)> {
        None
    }
}

impl<F: FnMut(i32, i32)> PixelVisitor for F {
    fn visit(&mut self, x: i32, y: i32) {
        self(x, y)
    }
}

/// Visitor painting every pixel one color.
pub struct SolidFill<'a> {
    pub frame: &'a mut FrameBuffers,
    pub color: Color,
}

impl PixelVisitor for SolidFill<'_> {
    fn visit(&mut self, x: i32, y: i32) {
        self.frame.set_pixel(x, y, self.color);
    }

    fn clip_rect(&self) -> Option<(u32, u32)> {
        Some((self.frame.width(), self.frame.height()))
    }
}

/// A triangle corner during scan conversion; x stays fractional so split
/// points do not drift.
#[derive(Clone, Copy)]
struct EdgePoint {
    x: f64,
    y: i32,
}

impl From<RasterPos> for EdgePoint {
    fn from(p: RasterPos) -> Self {
        Self { x: p.x as f64, y: p.y }
    }
}

/// X of the edge `a`-`b` on scanline `y`.
#[inline]
fn edge_x(a: EdgePoint, b: EdgePoint, y: i32) -> f64 {
    let inv_slope = (b.x - a.x) / (b.y - a.y) as f64;
    a.x + inv_slope * (y - a.y) as f64
}

/// Visit the inclusive span between two edge positions on scanline `y`.
#[inline]
fn draw_span<V: PixelVisitor + ?Sized>(
    x1: f64,
    x2: f64,
    y: i32,
    clip: Option<(u32, u32)>,
    visitor: &mut V,
) {
    let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
    let mut start = lo.floor() as i32;
    let mut end = hi.floor() as i32;
    if let Some((width, _)) = clip {
        start = start.max(0);
        end = end.min(width as i32 - 1);
    }
    for x in start..=end {
        visitor.visit(x, y);
    }
}

/// Scanline range `[y_start, y_end]` restricted to the clip rectangle.
#[inline]
fn clip_rows(y_start: i32, y_end: i32, clip: Option<(u32, u32)>) -> (i32, i32) {
    match clip {
        Some((_, height)) => (y_start.max(0), y_end.min(height as i32 - 1)),
        None => (y_start, y_end),
    }
}

/// Triangle whose bottom edge `b`-`c` is horizontal, apex `a` on top.
fn fill_flat_bottom<V: PixelVisitor + ?Sized>(
    a: EdgePoint,
    b: EdgePoint,
    c: EdgePoint,
    clip: Option<(u32, u32)>,
    visitor: &mut V,
) {
    let (y_start, y_end) = clip_rows(a.y, b.y, clip);
    for y in y_start..=y_end {
        draw_span(edge_x(a, b, y), edge_x(a, c, y), y, clip, visitor);
    }
}

/// Triangle whose top edge `a`-`b` is horizontal, apex `c` at the bottom.
fn fill_flat_top<V: PixelVisitor + ?Sized>(
    a: EdgePoint,
    b: EdgePoint,
    c: EdgePoint,
    clip: Option<(u32, u32)>,
    visitor: &mut V,
) {
    let (y_start, y_end) = clip_rows(a.y, c.y, clip);
    for y in y_start..=y_end {
        draw_span(edge_x(a, c, y), edge_x(b, c, y), y, clip, visitor);
    }
}

/// Rasterize the triangle `(p1, p2, p3)`, visiting every covered pixel.
///
/// Triangles with zero area in pixel space (collinear or coincident
/// corners) visit nothing.
pub fn fill_triangle<V: PixelVisitor + ?Sized>(
    p1: RasterPos,
    p2: RasterPos,
    p3: RasterPos,
    visitor: &mut V,
) {
    let twice_area = (p2.x as i64 - p1.x as i64) * (p3.y as i64 - p1.y as i64)
        - (p3.x as i64 - p1.x as i64) * (p2.y as i64 - p1.y as i64);
    if twice_area == 0 {
        return;
    }

    // Sort by ascending y
    let mut pts = [p1, p2, p3];
    pts.sort_by_key(|p| p.y);
    let [a, b, c] = pts.map(EdgePoint::from);
    let clip = visitor.clip_rect();

    if b.y == c.y {
        fill_flat_bottom(a, b, c, clip, visitor);
    } else if a.y == b.y {
        fill_flat_top(a, b, c, clip, visitor);
    } else {
        // Split on b's scanline where the long edge a-c crosses it
        let split = EdgePoint {
            x: edge_x(a, c, b.y),
            y: b.y,
        };
        fill_flat_bottom(a, b, split, clip, visitor);
        fill_flat_top(b, split, c, clip, visitor);
    }
}

/// Cohen-Sutherland region codes
const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const TOP: u8 = 0b0100;
const BOTTOM: u8 = 0b1000;

fn region_code(x: f64, y: f64, max_x: f64, max_y: f64) -> u8 {
    let mut code = INSIDE;
    if x < 0.0 {
        code |= LEFT;
    } else if x > max_x {
        code |= RIGHT;
    }
    if y < 0.0 {
        code |= TOP;
    } else if y > max_y {
        code |= BOTTOM;
    }
    code
}

/// Clip a segment to `[0, max_x] x [0, max_y]`.
fn clip_segment(
    mut x0: f64,
    mut y0: f64,
    mut x1: f64,
    mut y1: f64,
    max_x: f64,
    max_y: f64,
) -> Option<(f64, f64, f64, f64)> {
    let mut code0 = region_code(x0, y0, max_x, max_y);
    let mut code1 = region_code(x1, y1, max_x, max_y);

    loop {
        if code0 | code1 == INSIDE {
            return Some((x0, y0, x1, y1));
        }
        if code0 & code1 != INSIDE {
            return None;
        }

        let out = if code0 != INSIDE { code0 } else { code1 };
        let (x, y) = if out & BOTTOM != 0 {
            (x0 + (x1 - x0) * (max_y - y0) / (y1 - y0), max_y)
        } else if out & TOP != 0 {
            (x0 + (x1 - x0) * (0.0 - y0) / (y1 - y0), 0.0)
        } else if out & RIGHT != 0 {
            (max_x, y0 + (y1 - y0) * (max_x - x0) / (x1 - x0))
        } else {
            (0.0, y0 + (y1 - y0) * (0.0 - x0) / (x1 - x0))
        };

        if out == code0 {
            x0 = x;
            y0 = y;
            code0 = region_code(x0, y0, max_x, max_y);
        } else {
            x1 = x;
            y1 = y;
            code1 = region_code(x1, y1, max_x, max_y);
        }
    }
}

/// Bresenham line from `p0` to `p1`, clipped to the frame first.
pub fn draw_line(frame: &mut FrameBuffers, p0: RasterPos, p1: RasterPos, color: Color) {
    if frame.width() == 0 || frame.height() == 0 {
        return;
    }
    let max_x = (frame.width() - 1) as f64;
    let max_y = (frame.height() - 1) as f64;
    let Some((fx0, fy0, fx1, fy1)) = clip_segment(
        p0.x as f64,
        p0.y as f64,
        p1.x as f64,
        p1.y as f64,
        max_x,
        max_y,
    ) else {
        return;
    };

    let (mut x0, mut y0) = (fx0.round() as i32, fy0.round() as i32);
    let (x1, y1) = (fx1.round() as i32, fy1.round() as i32);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        frame.set_pixel(x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Triangle outline.
pub fn draw_triangle(
    frame: &mut FrameBuffers,
    p1: RasterPos,
    p2: RasterPos,
    p3: RasterPos,
    color: Color,
) {
    draw_line(frame, p1, p2, color);
    draw_line(frame, p2, p3, color);
    draw_line(frame, p3, p1, color);
}

/// Midpoint circle outline.
pub fn draw_circle(frame: &mut FrameBuffers, center: RasterPos, radius: i32, color: Color) {
    if radius <= 0 {
        frame.set_pixel(center.x, center.y, color);
        return;
    }

    let (xc, yc) = (center.x, center.y);
    let mut x = 0;
    let mut y = radius;
    let mut m = 5 - 4 * radius;
    while x <= y {
        for (px, py) in [
            (xc + x, yc + y),
            (xc - x, yc + y),
            (xc + x, yc - y),
            (xc - x, yc - y),
            (xc + y, yc + x),
            (xc - y, yc + x),
            (xc + y, yc - x),
            (xc - y, yc - x),
        ] {
            frame.set_pixel(px, py, color);
        }
        if m > 0 {
            y -= 1;
            m -= 8 * y;
        }
        x += 1;
        m += 8 * x + 4;
    }
}

/// Filled triangle in a single color.
pub fn draw_filled_triangle(
    frame: &mut FrameBuffers,
    p1: RasterPos,
    p2: RasterPos,
    p3: RasterPos,
    color: Color,
) {
    fill_triangle(p1, p2, p3, &mut SolidFill { frame, color });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn collect(p1: RasterPos, p2: RasterPos, p3: RasterPos) -> Vec<(i32, i32)> {
        let mut pixels = Vec::new();
        fill_triangle(p1, p2, p3, &mut |x: i32, y: i32| pixels.push((x, y)));
        pixels
    }

    fn rp(x: i32, y: i32) -> RasterPos {
        RasterPos::new(x, y)
    }

    #[test]
    fn test_flat_bottom_rows() {
        let pixels = collect(rp(5, 0), rp(0, 5), rp(10, 5));
        let set: HashSet<_> = pixels.iter().copied().collect();

        // Apex row is a single pixel, base row spans the full width
        assert!(set.contains(&(5, 0)));
        for x in 0..=10 {
            assert!(set.contains(&(x, 5)), "missing ({x}, 5)");
        }
        assert!(pixels.iter().all(|&(_, y)| (0..=5).contains(&y)));
    }

    #[test]
    fn test_flat_top_rows() {
        let pixels = collect(rp(0, 0), rp(10, 0), rp(5, 5));
        let set: HashSet<_> = pixels.iter().copied().collect();

        for x in 0..=10 {
            assert!(set.contains(&(x, 0)));
        }
        assert!(set.contains(&(5, 5)));
        assert!(!set.contains(&(0, 5)));
    }

    #[test]
    fn test_vertex_order_does_not_matter() {
        let a = rp(3, 1);
        let b = rp(17, 6);
        let c = rp(8, 14);
        let reference: HashSet<_> = collect(a, b, c).into_iter().collect();

        for (p1, p2, p3) in [(b, c, a), (c, a, b), (a, c, b), (c, b, a)] {
            let set: HashSet<_> = collect(p1, p2, p3).into_iter().collect();
            assert_eq!(set, reference);
        }
    }

    #[test]
    fn test_general_triangle_rows_are_contiguous() {
        let pixels = collect(rp(3, 1), rp(17, 6), rp(8, 14));
        let mut rows: std::collections::BTreeMap<i32, Vec<i32>> = Default::default();
        for (x, y) in pixels {
            rows.entry(y).or_default().push(x);
        }

        assert_eq!(rows.keys().copied().collect::<Vec<_>>(), (1..=14).collect::<Vec<_>>());
        for xs in rows.values_mut() {
            xs.sort_unstable();
            xs.dedup();
            assert!(xs.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_degenerate_triangle_visits_nothing() {
        assert!(collect(rp(0, 0), rp(5, 5), rp(10, 10)).is_empty());
        assert!(collect(rp(0, 3), rp(5, 3), rp(9, 3)).is_empty());
        assert!(collect(rp(4, 4), rp(4, 4), rp(4, 4)).is_empty());
    }

    #[test]
    fn test_clip_rect_limits_visits() {
        let mut frame = FrameBuffers::new(8, 8);
        draw_filled_triangle(&mut frame, rp(-20, -20), rp(40, -20), rp(4, 40), Color::RED);

        // Covers the whole frame without touching anything out of range
        assert!(frame.pixels().iter().all(|&c| c == Color::RED));
    }

    #[test]
    fn test_draw_line_endpoints_and_clipping() {
        let mut frame = FrameBuffers::new(10, 10);
        draw_line(&mut frame, rp(1, 1), rp(8, 5), Color::WHITE);
        assert_eq!(frame.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(frame.pixel(8, 5), Some(Color::WHITE));

        // Far off-screen endpoints are clipped, not walked
        let mut frame = FrameBuffers::new(10, 10);
        draw_line(&mut frame, rp(-1_000_000_000, 5), rp(1_000_000_000, 5), Color::WHITE);
        for x in 0..10 {
            assert_eq!(frame.pixel(x, 5), Some(Color::WHITE));
        }

        // Entirely outside
        let mut frame = FrameBuffers::new(10, 10);
        draw_line(&mut frame, rp(-5, -5), rp(-1, 20), Color::WHITE);
        assert!(frame.pixels().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn test_draw_circle_is_symmetric() {
        let mut frame = FrameBuffers::new(21, 21);
        draw_circle(&mut frame, rp(10, 10), 5, Color::GREEN);

        for (x, y) in [(15, 10), (5, 10), (10, 15), (10, 5)] {
            assert_eq!(frame.pixel(x, y), Some(Color::GREEN), "({x}, {y})");
        }
        assert_eq!(frame.pixel(10, 10), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_triangle_outline() {
        let mut frame = FrameBuffers::new(20, 20);
        draw_triangle(&mut frame, rp(2, 2), rp(17, 2), rp(2, 17), Color::BLUE);

        assert_eq!(frame.pixel(10, 2), Some(Color::BLUE));
        assert_eq!(frame.pixel(2, 10), Some(Color::BLUE));
        // Interior untouched
        assert_eq!(frame.pixel(5, 5), Some(Color::BLACK));
    }
}
