//! Pinhole Core - scene data for the software renderer.
//!
//! This crate provides:
//!
//! - **Colors**: packed `0xAARRGGBB` pixels with mixing and brightness helpers
//! - **Meshes**: `Mesh`, `Vertex`, `Face` with the per-frame scratch fields
//!   the renderer writes during projection
//!
//! # Example
//!
//! ```
//! use pinhole_core::{Color, Mesh};
//! use pinhole_math::DVec3;
//!
//! let mesh = Mesh::tetrahedron(DVec3::ZERO);
//! assert_eq!(mesh.face_count(), 4);
//! assert_eq!(mesh.face(0).unwrap().color, Color::BLUE);
//! ```

pub mod color;
pub mod mesh;

// Re-export commonly used types
pub use color::{Color, ColorParseError};
pub use mesh::{Face, FaceRef, Mesh, MeshError, RasterPos, ScreenPoint, Vertex};
