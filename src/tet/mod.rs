//! Tetrahedral volume meshes.
//!
//! [`TetMesh`] stores tets with half-face connectivity: every tet owns four
//! outward-wound half-faces, and two tets sharing a triangle see each other
//! through the half-face twin relation.
//!
//! ```
//! use tetkit::tet::TetMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = TetMesh::new();
//! mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
//! mesh.construct_tet_with_orientation([1, 0, 2, 3]).unwrap();
//! mesh.label_boundary();
//!
//! assert_eq!(mesh.num_faces(), 4);
//! assert!(mesh.total_volume() > 0.0);
//! ```

mod construct;
mod mesh;

pub use construct::{signed_volume, DEFAULT_DEGENERATE_VOLUME, TET_EDGES, TET_FACES};
pub use mesh::{Edge, Face, HalfEdge, HalfFace, Tet, TetMesh, Vertex};

#[cfg(test)]
pub(crate) use construct::tests as fixtures;
