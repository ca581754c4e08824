//! Frame driver: owns the scene, the camera and the frame buffers.
//!
//! A frame is produced by [`Renderer::update`] (projection and per-face
//! caches) followed by a list of [`DrawOp`]s. Two ops fill the depth and
//! face buffers: [`DrawOp::Rasterize`] (clip and scan-convert) and
//! [`DrawOp::RayTrace`] (one ray per pixel). Shading and overlay ops then
//! work from those buffers.

use pinhole_core::{Color, FaceRef, Mesh};
use pinhole_math::{DVec3, Ray};
use thiserror::Error;

use crate::camera::{Camera, CameraError};
use crate::clip::{ClipVertex, Frustum};
use crate::config::RenderConfig;
use crate::frame::{DepthWriter, FrameBuffers};
use crate::raster::{draw_circle, draw_line, draw_triangle, fill_triangle};
use crate::raycast::{cast_ray, trace_ray, RayHit};
use crate::shading::{self, Lighting, PickOverlay};

/// Renderer construction and configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid frame size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f64),

    #[error("Invalid clip range: near {near}, far {far}")]
    InvalidClipRange { near: f64, far: f64 },

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
}

/// One step of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawOp {
    /// Fill the color buffer with the background and drop all coverage
    Clear,
    /// Clip and rasterize every face into the depth and face buffers
    Rasterize,
    /// Flat face colors
    Flat,
    /// Lambert-lit face colors
    Lit,
    /// Depth as grey levels
    DepthView,
    /// Interpolated normals as colors
    NormalView,
    /// Face outlines
    Wireframe,
    /// Vertex markers
    Vertices,
    /// World origin and unit axes
    Axes,
    /// Recolor the visible part of the highlighted face
    Highlight,
    /// Trace one ray per pixel, filling all three buffers
    RayTrace,
}

/// Counters of the last rasterization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Faces considered
    pub faces: usize,
    /// Faces skipped for a zero-area projection
    pub degenerate: usize,
    /// Faces entirely outside the view volume
    pub clipped: usize,
    /// Triangles handed to the rasterizer after clipping
    pub triangles: usize,
    /// Pixels where a face won the depth test
    pub pixels: usize,
}

/// Software renderer for a set of triangle meshes.
pub struct Renderer {
    config: RenderConfig,
    camera: Camera,
    frustum: Frustum,
    frame: FrameBuffers,
    meshes: Vec<Mesh>,
    highlight: Option<FaceRef>,
    stats: FrameStats,
}

fn check_dimensions(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl Renderer {
    /// Create a renderer for a `width` x `height` frame.
    ///
    /// The camera starts at the origin looking down -Z.
    pub fn new(width: u32, height: u32, config: RenderConfig) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        config.validate()?;

        let camera = Camera::new(width, height, config.fov_degrees);
        let frustum = Frustum::new(width, height, config.near, config.far);
        let mut frame = FrameBuffers::new(width, height);
        frame.clear_color(config.background);

        log::info!(
            "Created renderer {}x{} (fov {:.1}, clip {}..{})",
            width,
            height,
            config.fov_degrees,
            config.near,
            config.far
        );

        Ok(Self {
            config,
            camera,
            frustum,
            frame,
            meshes: Vec::new(),
            highlight: None,
            stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration, keeping the frame size.
    pub fn set_config(&mut self, config: RenderConfig) -> Result<(), RenderError> {
        config.validate()?;
        self.camera.set_fov(config.fov_degrees);
        self.frustum = Frustum::new(self.width(), self.height(), config.near, config.far);
        self.config = config;
        Ok(())
    }

    /// Register a mesh and return its index, the `mesh` part of every
    /// [`FaceRef`] into it.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        log::info!(
            "Added mesh '{}': {} vertices, {} faces",
            mesh.name,
            mesh.vertex_count(),
            mesh.face_count()
        );
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    /// Mutable mesh access. Call [`Renderer::update`] before drawing again.
    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    /// Place the camera. `up = None` keeps the previous up hint.
    pub fn set_camera(
        &mut self,
        position: DVec3,
        forward: DVec3,
        up: Option<DVec3>,
    ) -> Result<(), RenderError> {
        self.camera.set(position, forward, up).map_err(|err| {
            log::warn!("Rejected camera (forward {:?}, up {:?}): {}", forward, up, err);
            RenderError::from(err)
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Change the frame size. All buffers are reallocated and cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        check_dimensions(width, height)?;
        if width == self.width() && height == self.height() {
            return Ok(());
        }

        self.camera.resize(width, height);
        self.frustum = Frustum::new(width, height, self.config.near, self.config.far);
        self.frame.resize(width, height);
        self.frame.clear_color(self.config.background);

        log::info!("Resized to {}x{}", width, height);
        Ok(())
    }

    pub fn set_highlight(&mut self, face: Option<FaceRef>) {
        self.highlight = face;
    }

    pub fn highlight(&self) -> Option<FaceRef> {
        self.highlight
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Counters of the last rasterization.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Refresh normals, projected vertices and barycentric caches for the
    /// current camera.
    pub fn update(&mut self) {
        let camera = &self.camera;
        for mesh in &mut self.meshes {
            mesh.compute_normals();
            for vertex in mesh.vertices_mut() {
                let (cam, screen) = camera.project(vertex.world);
                vertex.cam = cam;
                vertex.screen = screen;
                vertex.raster = screen.raster();
            }
            mesh.update_barycentric();
        }
    }

    /// Run one draw op against the current projection.
    pub fn draw(&mut self, op: DrawOp) {
        let background = self.config.background;
        match op {
            DrawOp::Clear => {
                self.frame.clear_color(background);
                self.frame.clear_coverage();
            }
            DrawOp::Rasterize => self.rasterize(),
            DrawOp::Flat => {
                shading::shade_flat(&mut self.frame, &self.meshes, background, self.highlight)
            }
            DrawOp::Lit => {
                let lighting = Lighting::new(self.config.to_light(), self.config.ambient);
                shading::shade_lit(
                    &mut self.frame,
                    &self.meshes,
                    background,
                    lighting,
                    self.highlight,
                );
            }
            DrawOp::DepthView => shading::shade_depth(&mut self.frame, background),
            DrawOp::NormalView => shading::shade_normals(&mut self.frame, &self.meshes, background),
            DrawOp::Wireframe => self.draw_wireframe(),
            DrawOp::Vertices => self.draw_vertices(),
            DrawOp::Axes => self.draw_axes(),
            DrawOp::Highlight => self.draw_highlight(),
            DrawOp::RayTrace => self.ray_trace(),
        }
    }

    /// Update, then run `ops` in order.
    pub fn frame(&mut self, ops: &[DrawOp]) {
        self.update();
        for &op in ops {
            self.draw(op);
        }
        log::debug!("Frame {:?}: {:?}", ops, self.stats);
    }

    fn rasterize(&mut self) {
        self.frame.clear_coverage();
        let mut stats = FrameStats::default();

        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            for (face_index, face) in mesh.faces().iter().enumerate() {
                stats.faces += 1;
                let Some(barycentric) = face.barycentric else {
                    stats.degenerate += 1;
                    continue;
                };

                let [a, b, c] = mesh.face_vertices(face);
                let polygon = self.frustum.clip_triangle([
                    ClipVertex::from(a.screen),
                    ClipVertex::from(b.screen),
                    ClipVertex::from(c.screen),
                ]);
                if polygon.is_empty() {
                    stats.clipped += 1;
                    continue;
                }

                let depths = [a.screen.depth, b.screen.depth, c.screen.depth];
                let face_ref = FaceRef::new(mesh_index, face_index);
                let mut writer = DepthWriter::new(&mut self.frame, barycentric, depths, face_ref);
                for [p0, p1, p2] in polygon.triangles() {
                    fill_triangle(p0.raster(), p1.raster(), p2.raster(), &mut writer);
                    stats.triangles += 1;
                }
                stats.pixels += writer.written();
            }
        }

        self.stats = stats;
    }

    fn ray_trace(&mut self) {
        self.frame.clear_coverage();
        let mut stats = FrameStats {
            faces: self.meshes.iter().map(Mesh::face_count).sum(),
            ..Default::default()
        };

        for y in 0..self.height() {
            for x in 0..self.width() {
                let ray = self.camera.pixel_ray(x, y);
                let Some(hit) = cast_ray(&self.meshes, &ray) else {
                    continue;
                };
                let depth = self.camera.to_camera(hit.point).z;
                if self.frame.test_and_set(x as i32, y as i32, depth, hit.face) {
                    stats.pixels += 1;
                }
            }
        }

        shading::shade_flat(
            &mut self.frame,
            &self.meshes,
            self.config.background,
            self.highlight,
        );
        self.stats = stats;
    }

    /// Whether every vertex of an overlay primitive is in front of the
    /// near plane.
    fn in_front(&self, depths: &[f64]) -> bool {
        depths.iter().all(|&d| d >= self.config.near)
    }

    fn draw_wireframe(&mut self) {
        let color = self.config.wireframe_color;
        for mesh in &self.meshes {
            for face in mesh.faces() {
                let [a, b, c] = mesh.face_vertices(face);
                if !self.in_front(&[a.screen.depth, b.screen.depth, c.screen.depth]) {
                    continue;
                }
                draw_triangle(&mut self.frame, a.raster, b.raster, c.raster, color);
            }
        }
    }

    fn draw_vertices(&mut self) {
        let color = self.config.vertex_color;
        let radius = self.config.vertex_radius;
        for mesh in &self.meshes {
            for vertex in mesh.vertices() {
                if vertex.screen.depth >= self.config.near {
                    draw_circle(&mut self.frame, vertex.raster, radius, color);
                }
            }
        }
    }

    fn draw_axes(&mut self) {
        let (_, origin) = self.camera.project(DVec3::ZERO);
        let length = self.config.axis_length;
        let axes = [
            (DVec3::X, Color::RED),
            (DVec3::Y, Color::GREEN),
            (DVec3::Z, Color::BLUE),
        ];

        for (axis, color) in axes {
            let (_, tip) = self.camera.project(axis * length);
            if self.in_front(&[origin.depth, tip.depth]) {
                draw_line(&mut self.frame, origin.raster(), tip.raster(), color);
            }
        }
    }

    fn draw_highlight(&mut self) {
        let Some(face_ref) = self.highlight else {
            return;
        };
        let Some((mesh, face)) = shading::resolve(&self.meshes, face_ref) else {
            return;
        };

        let [a, b, c] = mesh.face_vertices(face);
        let polygon = self.frustum.clip_triangle([
            ClipVertex::from(a.screen),
            ClipVertex::from(b.screen),
            ClipVertex::from(c.screen),
        ]);
        let mut overlay = PickOverlay::new(&mut self.frame, face_ref, face.color.negate());
        for [p0, p1, p2] in polygon.triangles() {
            fill_triangle(p0.raster(), p1.raster(), p2.raster(), &mut overlay);
        }
    }

    /// Face visible through screen point `(sx, sy)`, by casting a ray.
    pub fn pick(&self, sx: f64, sy: f64) -> Option<FaceRef> {
        let ray = Ray::new(self.camera.position(), self.camera.ray_direction(sx, sy));
        let face = self.cast(&ray).map(|hit| hit.face);
        log::debug!("Pick ({:.1}, {:.1}) -> {:?}", sx, sy, face);
        face
    }

    /// Nearest face along an arbitrary world-space ray.
    pub fn cast(&self, ray: &Ray) -> Option<RayHit> {
        cast_ray(&self.meshes, ray)
    }

    /// Ray-traced color of pixel `(x, y)` without touching the buffers.
    pub fn trace_pixel(&self, x: u32, y: u32) -> Color {
        trace_ray(
            &self.meshes,
            &self.camera.pixel_ray(x, y),
            self.config.background,
            self.highlight,
        )
    }

    /// Dense row-major color buffer.
    pub fn pixels(&self) -> &[Color] {
        self.frame.pixels()
    }

    /// Color buffer as raw bytes, one native-endian `u32` per pixel.
    pub fn pixels_as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.frame.pixel(x as i32, y as i32)
    }

    /// Camera depth of the visible surface at `(x, y)`.
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f64> {
        self.frame.depth(x as i32, y as i32)
    }

    /// Face visible at `(x, y)` in the last rasterized or traced frame.
    pub fn face_at(&self, x: u32, y: u32) -> Option<FaceRef> {
        self.frame.face(x as i32, y as i32)
    }
}
