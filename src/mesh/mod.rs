//! Core surface mesh data structures.
//!
//! This module provides the element pool and the half-edge surface mesh that
//! tet boundary extraction produces.
//!
//! # Overview
//!
//! The primary type is [`SurfaceMesh`], a triangle mesh stored as half-edges
//! (doubly-connected edge list). Navigation is O(1) per step and rotation
//! around a vertex follows a fixed counter-clockwise or clockwise order, also
//! on the boundary.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`], [`HalfEdgeId`], [`FaceId`], [`EdgeId`] for surfaces
//! - [`TetVertexId`], [`TetHalfEdgeId`], [`TetEdgeId`], [`HalfFaceId`],
//!   [`TetFaceId`], [`TetId`] for tet meshes
//!
//! All of them index a [`Pool`], which never reuses a slot.
//!
//! # Construction
//!
//! Surface meshes are built from a [`TetMesh`](crate::tet::TetMesh):
//!
//! ```no_run
//! use tetkit::io::load_tet;
//! use tetkit::mesh::SurfaceMesh;
//!
//! let tets = load_tet("model.t").unwrap();
//! let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();
//! for v in surface.vertex_ids() {
//!     println!("{:?} has {} neighbours", v, surface.valence(v));
//! }
//! ```

mod builder;
mod extract;
mod halfedge;
pub mod index;
mod pool;
mod traverse;
mod validate;

pub use builder::to_face_vertex;
pub use halfedge::{Edge, Face, HalfEdge, SurfaceMesh, Vertex};
pub use index::{
    EdgeId, ElementId, FaceId, HalfEdgeId, HalfFaceId, TetEdgeId, TetFaceId, TetHalfEdgeId,
    TetId, TetVertexId, VertexId,
};
pub use pool::{Iter, Pool};
pub use traverse::{FaceHalfEdges, FanEdges, FanHalfEdges, FanVertices, VertexEdges, VertexVertices};
