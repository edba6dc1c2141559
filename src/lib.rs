//! # tetkit
//!
//! Topology engine for tetrahedral volume meshes and their boundary surfaces.
//!
//! tetkit stores tets with half-face connectivity, repairs tet orientation on
//! construction, classifies the domain boundary, and extracts it as a
//! half-edge triangle mesh whose elements point back into the volume.
//!
//! ## Features
//!
//! - **Pooled storage**: every element kind lives in a pool with stable,
//!   type-safe ids; deleted slots are tombstoned, never reused
//! - **Tet meshes**: shared edges and faces resolved on construction, twin
//!   half-faces across shared triangles, signed-volume orientation repair
//! - **Surface meshes**: half-edges without boundary half-edges, with ordered
//!   counter-clockwise and clockwise rotation around every vertex
//! - **File formats**: `.t` tet meshes in and out; OBJ, PLY and STL export
//!
//! ## Quick Start
//!
//! ```no_run
//! use tetkit::prelude::*;
//!
//! // Load a tet mesh
//! let tets = tetkit::io::load_tet("model.t").unwrap();
//! println!("Tets: {}", tets.num_tets());
//!
//! // Extract its boundary
//! let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();
//! for f in surface.face_ids() {
//!     let source = surface.face_source(f);
//!     println!("{:?} came from {:?} of {:?}", f, source, tets.half_face_tet(source));
//! }
//!
//! tetkit::io::save(&surface, "boundary.stl").unwrap();
//! ```
//!
//! ## Building Tet Meshes Programmatically
//!
//! ```
//! use tetkit::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut tets = TetMesh::new();
//! for p in [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 1.0),
//! ] {
//!     tets.add_vertex(p);
//! }
//! tets.construct_tet_with_orientation([0, 1, 2, 3]).unwrap();
//! tets.construct_tet_with_orientation([4, 1, 2, 3]).unwrap();
//! tets.label_boundary();
//!
//! assert_eq!(tets.num_faces(), 7);
//! assert_eq!(tets.boundary_half_faces().count(), 6);
//! ```
//!
//! ## Surface Traversal
//!
//! ```
//! use tetkit::prelude::*;
//! use nalgebra::Point3;
//!
//! # let mut tets = TetMesh::new();
//! # for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
//! #     tets.add_vertex(Point3::from(p));
//! # }
//! # tets.construct_tet_with_orientation([0, 1, 2, 3]).unwrap();
//! # tets.label_boundary();
//! let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();
//!
//! // Neighbours of a vertex in counter-clockwise order
//! let v = VertexId::new(0);
//! for neighbor in surface.vertex_ccw_vertices(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Vertices of a face
//! let [v0, v1, v2] = surface.face_triangle(FaceId::new(0));
//! # let _ = (v0, v1, v2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod tet;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tetkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::io::LoadOptions;
    pub use crate::mesh::{
        to_face_vertex, EdgeId, FaceId, HalfEdgeId, HalfFaceId, Pool, SurfaceMesh, TetEdgeId,
        TetFaceId, TetHalfEdgeId, TetId, TetVertexId, VertexId,
    };
    pub use crate::tet::TetMesh;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
