//! Frame buffers: color, depth and face reference, all the same size.
//!
//! The face buffer records which face won the depth test at each pixel,
//! letting shading passes run after rasterization from the winning face's
//! normals and color.

use pinhole_core::{Color, FaceRef};
use pinhole_math::Barycentric;

use crate::raster::PixelVisitor;

/// Depth value of a pixel no face has covered yet.
pub const NO_COVERAGE: f64 = -1.0;

/// Color, depth and face buffers for one `width` x `height` frame.
pub struct FrameBuffers {
    width: u32,
    height: u32,
    color: Vec<Color>,
    depth: Vec<f64>,
    faces: Vec<Option<FaceRef>>,
}

impl FrameBuffers {
    /// Create buffers with no coverage and a black color buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            color: vec![Color::BLACK; len],
            depth: vec![NO_COVERAGE; len],
            faces: vec![None; len],
        }
    }

    /// Reallocate all three buffers if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer index of `(x, y)`, or `None` outside the frame.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Fill the color buffer.
    pub fn clear_color(&mut self, color: Color) {
        self.color.fill(color);
    }

    /// Forget all depth and face coverage.
    pub fn clear_coverage(&mut self) {
        self.depth.fill(NO_COVERAGE);
        self.faces.fill(None);
    }

    /// Dense row-major color buffer.
    pub fn pixels(&self) -> &[Color] {
        &self.color
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Write a color; out-of-range writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.color[i] = color;
        }
    }

    /// Stored depth at `(x, y)`, `None` when uncovered or out of range.
    pub fn depth(&self, x: i32, y: i32) -> Option<f64> {
        self.index(x, y)
            .map(|i| self.depth[i])
            .filter(|&d| d >= 0.0)
    }

    /// Winning face at `(x, y)`.
    pub fn face(&self, x: i32, y: i32) -> Option<FaceRef> {
        self.index(x, y).and_then(|i| self.faces[i])
    }

    /// Depth test: store `depth` and `face` if the pixel is uncovered or
    /// `depth` is nearer than what is stored. Returns whether it won.
    pub fn test_and_set(&mut self, x: i32, y: i32, depth: f64, face: FaceRef) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let stored = self.depth[i];
        if stored < 0.0 || depth < stored {
            self.depth[i] = depth;
            self.faces[i] = Some(face);
            true
        } else {
            false
        }
    }

    /// Nearest and farthest covered depths.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        self.depth
            .iter()
            .filter(|&&d| d >= 0.0)
            .fold(None, |range, &d| match range {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Rewrite every pixel: covered pixels from `shade(x, y, depth, face)`,
    /// the rest with `background`.
    pub fn shade<F>(&mut self, background: Color, mut shade: F)
    where
        F: FnMut(u32, u32, f64, FaceRef) -> Color,
    {
        let width = self.width as usize;
        for (i, color) in self.color.iter_mut().enumerate() {
            *color = match self.faces[i] {
                Some(face) => shade((i % width) as u32, (i / width) as u32, self.depth[i], face),
                None => background,
            };
        }
    }

    /// Color buffer as raw bytes for blitting.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }
}

/// Rasterization visitor writing interpolated depth and the face reference.
pub struct DepthWriter<'a> {
    frame: &'a mut FrameBuffers,
    barycentric: Barycentric,
    depths: [f64; 3],
    face: FaceRef,
    written: usize,
}

impl<'a> DepthWriter<'a> {
    /// `depths` are the camera depths of the face's three vertices, in the
    /// vertex order `barycentric` was built from.
    pub fn new(
        frame: &'a mut FrameBuffers,
        barycentric: Barycentric,
        depths: [f64; 3],
        face: FaceRef,
    ) -> Self {
        Self {
            frame,
            barycentric,
            depths,
            face,
            written: 0,
        }
    }

    /// Pixels where this face won the depth test so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl PixelVisitor for DepthWriter<'_> {
    fn visit(&mut self, x: i32, y: i32) {
        let depth = self
            .barycentric
            .interpolate(x as f64 + 0.5, y as f64 + 0.5, self.depths);
        // Negative depth would collide with the coverage sentinel
        if !depth.is_finite() || depth < 0.0 {
            return;
        }
        if self.frame.test_and_set(x, y, depth, self.face) {
            self.written += 1;
        }
    }

    fn clip_rect(&self) -> Option<(u32, u32)> {
        Some((self.frame.width, self.frame.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::fill_triangle;
    use pinhole_core::RasterPos;
    use pinhole_math::DVec2;

    #[test]
    fn test_new_frame_is_uncovered() {
        let frame = FrameBuffers::new(4, 3);
        assert_eq!(frame.pixels().len(), 12);
        assert_eq!(frame.depth(0, 0), None);
        assert_eq!(frame.face(3, 2), None);
        assert_eq!(frame.depth_range(), None);
    }

    #[test]
    fn test_out_of_range_access_is_ignored() {
        let mut frame = FrameBuffers::new(4, 3);
        frame.set_pixel(-1, 0, Color::RED);
        frame.set_pixel(4, 0, Color::RED);
        frame.set_pixel(0, 3, Color::RED);
        assert!(frame.pixels().iter().all(|&c| c == Color::BLACK));
        assert_eq!(frame.pixel(10, 10), None);
        assert!(!frame.test_and_set(-5, 1, 1.0, FaceRef::new(0, 0)));
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut frame = FrameBuffers::new(2, 2);
        let far = FaceRef::new(0, 0);
        let near = FaceRef::new(0, 1);

        assert!(frame.test_and_set(1, 1, 5.0, far));
        assert!(frame.test_and_set(1, 1, 2.0, near));
        assert!(!frame.test_and_set(1, 1, 3.0, far));
        assert!(!frame.test_and_set(1, 1, 2.0, far));

        assert_eq!(frame.depth(1, 1), Some(2.0));
        assert_eq!(frame.face(1, 1), Some(near));
        assert_eq!(frame.depth_range(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_resize_reallocates_together() {
        let mut frame = FrameBuffers::new(2, 2);
        frame.test_and_set(0, 0, 1.0, FaceRef::new(0, 0));
        frame.resize(3, 5);

        assert_eq!((frame.width(), frame.height()), (3, 5));
        assert_eq!(frame.pixels().len(), 15);
        assert_eq!(frame.face(0, 0), None);
        assert_eq!(frame.as_bytes().len(), 60);
    }

    #[test]
    fn test_shade_visits_covered_pixels() {
        let mut frame = FrameBuffers::new(3, 1);
        frame.test_and_set(1, 0, 4.0, FaceRef::new(2, 7));
        frame.shade(Color::BLUE, |x, y, depth, face| {
            assert_eq!((x, y, depth, face), (1, 0, 4.0, FaceRef::new(2, 7)));
            Color::RED
        });
        assert_eq!(frame.pixels(), &[Color::BLUE, Color::RED, Color::BLUE]);
    }

    #[test]
    fn test_depth_writer_interpolates_plane() {
        let mut frame = FrameBuffers::new(64, 64);
        let p = [
            DVec2::new(4.0, 4.0),
            DVec2::new(60.0, 8.0),
            DVec2::new(10.0, 60.0),
        ];
        let bary = Barycentric::from_screen(p[0], p[1], p[2]).unwrap();
        let depths = [2.0, 6.0, 10.0];

        let mut writer = DepthWriter::new(&mut frame, bary, depths, FaceRef::new(0, 0));
        fill_triangle(
            RasterPos::new(4, 4),
            RasterPos::new(60, 8),
            RasterPos::new(10, 60),
            &mut writer,
        );
        assert!(writer.written() > 0);

        let (lo, hi) = frame.depth_range().unwrap();
        assert!(lo >= 2.0 - 1e-9 && hi <= 10.0 + 1e-9);

        // Interior pixel matches the exact barycentric depth
        let expected = bary.interpolate(20.5, 20.5, depths);
        assert!((frame.depth(20, 20).unwrap() - expected).abs() < 1e-12);
    }
}
