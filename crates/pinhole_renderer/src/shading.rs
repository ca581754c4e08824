//! Shading passes run over the face buffer after rasterization.
//!
//! Rasterization only records which face is visible at each pixel; the
//! passes here turn that into colors. Every pass rewrites the full color
//! buffer, uncovered pixels getting the background.

use pinhole_core::{Color, Face, FaceRef, Mesh};
use pinhole_math::DVec3;

use crate::frame::FrameBuffers;
use crate::raster::PixelVisitor;

/// Brightest and darkest grey of the depth visualization.
const DEPTH_NEAR_GREY: f64 = 255.0;
const DEPTH_GREY_RANGE: f64 = 200.0;

/// Two-sided directional light with an ambient floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Unit vector from surfaces towards the light
    pub to_light: DVec3,
    /// Intensity of surfaces perpendicular to the light
    pub ambient: f64,
}

impl Lighting {
    pub fn new(to_light: DVec3, ambient: f64) -> Self {
        Self {
            to_light: to_light.normalize_or_zero(),
            ambient: ambient.clamp(0.0, 1.0),
        }
    }

    /// Brightness factor for a surface with unit `normal`.
    ///
    /// Faces are lit from either side.
    #[inline]
    pub fn intensity(&self, normal: DVec3) -> f64 {
        self.ambient + (1.0 - self.ambient) * normal.dot(self.to_light).abs()
    }
}

/// Look up the mesh and face a reference points to.
pub fn resolve(meshes: &[Mesh], face: FaceRef) -> Option<(&Mesh, &Face)> {
    let mesh = meshes.get(face.mesh)?;
    Some((mesh, mesh.face(face.face)?))
}

/// Unit surface normal of `face` at pixel `(x, y)`: the vertex normals
/// blended by the face's screen barycentric weights at the pixel centre.
///
/// Falls back to the flat face normal when the projection is degenerate or
/// the vertex normals cancel out.
pub fn surface_normal(mesh: &Mesh, face: &Face, x: u32, y: u32) -> DVec3 {
    let Some(barycentric) = face.barycentric else {
        return face.normal;
    };
    let [w0, w1, w2] = barycentric.weights(x as f64 + 0.5, y as f64 + 0.5);
    let [a, b, c] = mesh.face_vertices(face);
    let blended = a.normal * w0 + b.normal * w1 + c.normal * w2;
    blended.try_normalize().unwrap_or(face.normal)
}

/// Map a unit normal to RGB, each axis from [-1, 1] to [0, 1].
pub fn normal_to_color(normal: DVec3) -> Color {
    let n = normal * 0.5 + DVec3::splat(0.5);
    Color::from_unit(n.x, n.y, n.z)
}

/// Grey level of `depth` within `[near, far]`: white at `near`.
pub fn depth_to_grey(depth: f64, near: f64, far: f64) -> Color {
    let span = far - near;
    let t = if span > 0.0 {
        ((depth - near) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Color::grey((DEPTH_NEAR_GREY - t * DEPTH_GREY_RANGE).round() as u8)
}

/// Depth visualization normalized over the frame's covered depth range.
pub fn shade_depth(frame: &mut FrameBuffers, background: Color) {
    let Some((near, far)) = frame.depth_range() else {
        frame.clear_color(background);
        return;
    };
    frame.shade(background, |_, _, depth, _| depth_to_grey(depth, near, far));
}

/// Interpolated vertex normals as colors.
pub fn shade_normals(frame: &mut FrameBuffers, meshes: &[Mesh], background: Color) {
    frame.shade(background, |x, y, _, face| match resolve(meshes, face) {
        Some((mesh, f)) => normal_to_color(surface_normal(mesh, f, x, y)),
        None => background,
    });
}

/// Flat face colors, the highlighted face negated.
pub fn shade_flat(
    frame: &mut FrameBuffers,
    meshes: &[Mesh],
    background: Color,
    highlight: Option<FaceRef>,
) {
    frame.shade(background, |_, _, _, face| match resolve(meshes, face) {
        Some((_, f)) if highlight == Some(face) => f.color.negate(),
        Some((_, f)) => f.color,
        None => background,
    });
}

/// Lambert-lit face colors, the highlighted face negated.
pub fn shade_lit(
    frame: &mut FrameBuffers,
    meshes: &[Mesh],
    background: Color,
    lighting: Lighting,
    highlight: Option<FaceRef>,
) {
    frame.shade(background, |x, y, _, face| {
        let Some((mesh, f)) = resolve(meshes, face) else {
            return background;
        };
        let lit = f.color.scale(lighting.intensity(surface_normal(mesh, f, x, y)));
        if highlight == Some(face) {
            lit.negate()
        } else {
            lit
        }
    });
}

/// Rasterization visitor recoloring the pixels the face buffer assigns to
/// one face. Pixels where another face won the depth test stay untouched.
pub struct PickOverlay<'a> {
    frame: &'a mut FrameBuffers,
    face: FaceRef,
    color: Color,
    painted: usize,
}

impl<'a> PickOverlay<'a> {
    pub fn new(frame: &'a mut FrameBuffers, face: FaceRef, color: Color) -> Self {
        Self {
            frame,
            face,
            color,
            painted: 0,
        }
    }

    pub fn painted(&self) -> usize {
        self.painted
    }
}

impl PixelVisitor for PickOverlay<'_> {
    fn visit(&mut self, x: i32, y: i32) {
        if self.frame.face(x, y) == Some(self.face) {
            self.frame.set_pixel(x, y, self.color);
            self.painted += 1;
        }
    }

    fn clip_rect(&self) -> Option<(u32, u32)> {
        Some((self.frame.width(), self.frame.height()))
    }
}
