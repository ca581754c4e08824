//! Triangle mesh data model.
//!
//! A mesh owns its vertices and faces. Faces refer to vertices by index, so
//! the vertex storage can grow without invalidating them. Every vertex and
//! face carries scratch fields (camera-space position, screen position,
//! barycentric cache) that the renderer rewrites on each camera update; they
//! mean nothing between updates.

use pinhole_math::{Barycentric, DVec2, DVec3};
use thiserror::Error;

use crate::color::Color;

/// Errors raised while building a mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("Vertex index {index} out of range (mesh has {count} vertices)")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("Face references vertex {0} more than once")]
    DuplicateVertex(usize),
}

/// Integer pixel coordinates. May lie outside the frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterPos {
    pub x: i32,
    pub y: i32,
}

impl RasterPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncate a floating screen position to its pixel, saturating at the
    /// `i32` range.
    pub fn from_screen(x: f64, y: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
        }
    }
}

/// A projected point: screen x/y in pixels plus camera-space depth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64, depth: f64) -> Self {
        Self { x, y, depth }
    }

    pub fn xy(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn raster(&self) -> RasterPos {
        RasterPos::from_screen(self.x, self.y)
    }
}

/// A mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Position in the world
    pub world: DVec3,
    /// Position in camera space (scratch)
    pub cam: DVec3,
    /// Projected position (scratch)
    pub screen: ScreenPoint,
    /// Pixel holding `screen` (scratch)
    pub raster: RasterPos,
    /// Mean of the adjacent face normals
    pub normal: DVec3,
}

impl Vertex {
    pub fn new(world: DVec3) -> Self {
        Self {
            world,
            ..Default::default()
        }
    }
}

/// A triangular face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Indices of the three vertices in the owning mesh
    pub vertices: [usize; 3],
    /// Flat color
    pub color: Color,
    /// Unit normal of the world-space triangle (zero when degenerate)
    pub normal: DVec3,
    /// Barycentric coefficients of the current projection; `None` when the
    /// projected triangle has no area
    pub barycentric: Option<Barycentric>,
}

impl Face {
    pub fn new(vertices: [usize; 3], color: Color) -> Self {
        Self {
            vertices,
            color,
            normal: DVec3::ZERO,
            barycentric: None,
        }
    }
}

/// Identity of a face inside a scene: mesh index plus face index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub mesh: usize,
    pub face: usize,
}

impl FaceRef {
    pub const fn new(mesh: usize, face: usize) -> Self {
        Self { mesh, face }
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Build a mesh from positions and index triplets, all faces sharing
    /// `color`. Normals are computed.
    pub fn from_triangles(
        name: impl Into<String>,
        positions: &[DVec3],
        triangles: &[[usize; 3]],
        color: Color,
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new(name);
        for &p in positions {
            mesh.add_vertex(p);
        }
        for &tri in triangles {
            mesh.add_face(tri, color)?;
        }
        mesh.compute_normals();
        Ok(mesh)
    }

    /// Tetrahedron with one corner at `origin` and unit edges along the
    /// axes, each face a different color.
    pub fn tetrahedron(origin: DVec3) -> Self {
        let mut mesh = Self::new("tetrahedron");
        for corner in [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z] {
            mesh.add_vertex(origin + corner);
        }

        let faces = [
            ([0, 1, 2], Color::BLUE),
            ([0, 1, 3], Color::GREEN),
            ([0, 2, 3], Color::RED),
            ([1, 2, 3], Color::GREY),
        ];
        for (indices, color) in faces {
            mesh.faces.push(Face::new(indices, color));
        }

        mesh.compute_normals();
        mesh
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: DVec3) -> usize {
        self.vertices.push(Vertex::new(position));
        self.vertices.len() - 1
    }

    /// Append a face over existing vertices and return its index.
    ///
    /// Normals are not refreshed; call [`Mesh::compute_normals`] once the
    /// mesh is complete.
    pub fn add_face(&mut self, vertices: [usize; 3], color: Color) -> Result<usize, MeshError> {
        let count = self.vertices.len();
        for (i, &index) in vertices.iter().enumerate() {
            if index >= count {
                return Err(MeshError::VertexOutOfRange { index, count });
            }
            if vertices[..i].contains(&index) {
                return Err(MeshError::DuplicateVertex(index));
            }
        }

        self.faces.push(Face::new(vertices, color));
        Ok(self.faces.len() - 1)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// Read-only vertices alongside mutable faces, for refreshing per-face
    /// caches from vertex data.
    pub fn split_mut(&mut self) -> (&[Vertex], &mut [Face]) {
        (&self.vertices, &mut self.faces)
    }

    /// The three vertices of `face`.
    ///
    /// Face indices are validated on insertion, so indexing cannot fail for
    /// a face taken from this mesh.
    pub fn face_vertices(&self, face: &Face) -> [&Vertex; 3] {
        let [a, b, c] = face.vertices;
        [&self.vertices[a], &self.vertices[b], &self.vertices[c]]
    }

    /// World positions of the three vertices of `face`.
    pub fn face_positions(&self, face: &Face) -> [DVec3; 3] {
        let [a, b, c] = self.face_vertices(face);
        [a.world, b.world, c.world]
    }

    /// Move every vertex by `offset`. Normals are unaffected.
    pub fn translate(&mut self, offset: DVec3) {
        for vertex in &mut self.vertices {
            vertex.world += offset;
        }
    }

    /// Recompute face normals, then vertex normals as the normalized mean of
    /// the adjacent face normals.
    ///
    /// Degenerate faces get a zero normal and do not contribute. Vertices
    /// with no usable adjacent face get a zero normal.
    pub fn compute_normals(&mut self) {
        let mut sums = vec![DVec3::ZERO; self.vertices.len()];
        let mut degenerate = 0usize;

        for face in &mut self.faces {
            let [a, b, c] = face.vertices;
            let (pa, pb, pc) = (
                self.vertices[a].world,
                self.vertices[b].world,
                self.vertices[c].world,
            );
            face.normal = (pb - pa).cross(pc - pa).normalize_or_zero();
            if face.normal == DVec3::ZERO {
                degenerate += 1;
                continue;
            }
            for index in face.vertices {
                sums[index] += face.normal;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.normalize_or_zero();
        }

        if degenerate > 0 {
            log::debug!("Mesh {} has {} degenerate faces", self.name, degenerate);
        }
    }

    /// Refresh the barycentric cache of every face from the vertices'
    /// current screen positions. Returns the number of faces whose
    /// projection is degenerate.
    pub fn update_barycentric(&mut self) -> usize {
        let (vertices, faces) = self.split_mut();
        let mut degenerate = 0;
        for face in faces {
            let [a, b, c] = face.vertices;
            face.barycentric = Barycentric::from_screen(
                vertices[a].screen.xy(),
                vertices[b].screen.xy(),
                vertices[c].screen.xy(),
            );
            if face.barycentric.is_none() {
                degenerate += 1;
            }
        }
        degenerate
    }
}
