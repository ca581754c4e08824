//! Pinhole renderer - CPU rasterizer and ray tracer
//!
//! Draws triangle meshes through a pinhole camera into a 32-bit color
//! buffer, either by clipping and scan-converting every face against a
//! depth buffer or by casting one ray per pixel. Both paths fill the same
//! face buffer, so picking, highlighting and the shading passes work the
//! same after either.
//!
//! ```no_run
//! use pinhole_core::Mesh;
//! use pinhole_math::DVec3;
//! use pinhole_renderer::{DrawOp, RenderConfig, Renderer};
//!
//! let mut renderer = Renderer::new(320, 240, RenderConfig::default())?;
//! renderer.add_mesh(Mesh::tetrahedron(DVec3::ZERO));
//! renderer.set_camera(DVec3::new(1.0, 1.0, 4.0), DVec3::new(-0.2, -0.2, -1.0), Some(DVec3::Y))?;
//! renderer.frame(&[DrawOp::Clear, DrawOp::Rasterize, DrawOp::Lit, DrawOp::Wireframe]);
//! let pixels = renderer.pixels_as_bytes();
//! # Ok::<(), pinhole_renderer::RenderError>(())
//! ```

mod camera;
mod clip;
mod config;
mod frame;
mod raster;
mod raycast;
mod renderer;
pub mod shading;

pub use camera::{Basis, Camera, CameraError};
pub use clip::{ClipPlane, ClipPolygon, ClipVertex, Frustum, MAX_CLIP_VERTICES};
pub use config::RenderConfig;
pub use frame::{DepthWriter, FrameBuffers, NO_COVERAGE};
pub use raster::{
    draw_circle, draw_filled_triangle, draw_line, draw_triangle, fill_triangle, PixelVisitor,
    SolidFill,
};
pub use raycast::{cast_ray, trace_ray, RayHit};
pub use renderer::{DrawOp, FrameStats, RenderError, Renderer};
pub use shading::{Lighting, PickOverlay};

/// Re-export the scene and math types the API is expressed in
pub use pinhole_core::{Color, FaceRef, Mesh};
pub use pinhole_math::{DVec3, Ray};
