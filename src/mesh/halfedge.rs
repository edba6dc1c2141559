//! Half-edge surface mesh data structure.
//!
//! This module provides the triangle surface mesh produced by boundary
//! extraction. Elements live in [`Pool`]s and refer to each other by id.
//!
//! # Structure
//!
//! - Each triangle owns three **half-edges** linked in a `next`/`prev` cycle
//! - A half-edge knows its **source** and **target** vertex, its **face**, its
//!   full **edge**, and its **sym** (the opposite half-edge on the neighbouring
//!   triangle, absent on a boundary edge)
//! - Each edge stores one or two half-edges
//! - Each vertex stores one outgoing **anchor** half-edge and the unordered
//!   list of all its outgoing half-edges
//!
//! # Boundary Handling
//!
//! There are no boundary half-edges: a boundary edge simply has one half-edge
//! whose `sym` is `None`. After [`SurfaceMesh::label_boundary`] the anchor of a
//! boundary vertex is its most clockwise outgoing half-edge, so a
//! counter-clockwise sweep from the anchor covers the open fan exactly once.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, HalfFaceId, TetVertexId, VertexId};
use super::pool::Pool;
use crate::error::Result;

/// A vertex in the surface mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// The anchor outgoing half-edge, used as the start of rotational traversal.
    /// For boundary vertices this is the most clockwise outgoing half-edge.
    pub halfedge: HalfEdgeId,

    /// Whether the vertex lies on a boundary edge.
    pub boundary: bool,

    /// The tet mesh vertex this vertex was extracted from.
    pub source: TetVertexId,

    pub(crate) out_half_edges: Vec<HalfEdgeId>,
}

impl Vertex {
    /// Create a new isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            boundary: false,
            source: TetVertexId::invalid(),
            out_half_edges: Vec::new(),
        }
    }
}

/// A half-edge in the surface mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge starts at.
    pub source: VertexId,

    /// The vertex this half-edge points to.
    pub target: VertexId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The opposite half-edge on the neighbouring face, if any.
    pub sym: Option<HalfEdgeId>,

    /// The full edge this half-edge lies on.
    pub edge: EdgeId,

    /// The face this half-edge belongs to.
    pub face: FaceId,
}

/// A full edge, shared by one (boundary) or two half-edges.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// Incident half-edges; the second is invalid on a boundary edge.
    pub half_edges: [HalfEdgeId; 2],

    /// Whether this edge has a single incident half-edge.
    pub boundary: bool,
}

/// A triangular face.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// The anchor half-edge; vertices are read starting at its source.
    pub halfedge: HalfEdgeId,

    /// Whether any edge of this face is a boundary edge.
    pub boundary: bool,

    /// The tet mesh half-face this face was extracted from.
    pub source: HalfFaceId,
}

/// A half-edge triangle mesh.
///
/// Vertex and face ids are dense when the mesh is built by extraction. All
/// navigation queries index the pools directly and panic on dangling ids.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub(crate) vertices: Pool<Vertex, VertexId>,
    pub(crate) edges: Pool<Edge, EdgeId>,
    pub(crate) faces: Pool<Face, FaceId>,
    pub(crate) half_edges: Pool<HalfEdge, HalfEdgeId>,
}

impl SurfaceMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed triangle mesh: E = 3F/2
        Self {
            vertices: Pool::with_capacity(num_vertices),
            edges: Pool::with_capacity(num_faces * 3 / 2 + 1),
            faces: Pool::with_capacity(num_faces),
            half_edges: Pool::with_capacity(num_faces * 3),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of live edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of live half-edges.
    #[inline]
    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }

    /// Whether the mesh has no vertices and no faces.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// The vertex pool.
    #[inline]
    pub fn vertex_pool(&self) -> &Pool<Vertex, VertexId> {
        &self.vertices
    }

    /// The face pool.
    #[inline]
    pub fn face_pool(&self) -> &Pool<Face, FaceId> {
        &self.faces
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Get a vertex, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices.get(id)
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id]
    }

    /// Get a half-edge, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdge> {
        self.half_edges.get(id)
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Get an edge, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(id)
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    /// Get a face, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_face(&self, id: FaceId) -> Result<&Face> {
        self.faces.get(id)
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// The tet mesh vertex a surface vertex was extracted from.
    #[inline]
    pub fn vertex_source(&self, v: VertexId) -> TetVertexId {
        self.vertex(v).source
    }

    /// The tet mesh half-face a surface face was extracted from.
    #[inline]
    pub fn face_source(&self, f: FaceId) -> HalfFaceId {
        self.face(f).source
    }

    // ==================== Topology Queries ====================

    /// Get the source vertex of a half-edge.
    #[inline]
    pub fn source(&self, he: HalfEdgeId) -> VertexId {
        self.half_edge(he).source
    }

    /// Get the target vertex of a half-edge.
    #[inline]
    pub fn target(&self, he: HalfEdgeId) -> VertexId {
        self.half_edge(he).target
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edge(he).prev
    }

    /// Get the opposite half-edge, or `None` on a boundary edge.
    #[inline]
    pub fn sym(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edge(he).sym
    }

    /// Get the edge a half-edge lies on.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId) -> EdgeId {
        self.half_edge(he).edge
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.half_edge(he).face
    }

    /// The anchor outgoing half-edge of a vertex (invalid if isolated).
    #[inline]
    pub fn vertex_half_edge(&self, v: VertexId) -> HalfEdgeId {
        self.vertex(v).halfedge
    }

    /// The anchor half-edge of a face.
    #[inline]
    pub fn face_half_edge(&self, f: FaceId) -> HalfEdgeId {
        self.face(f).halfedge
    }

    /// The `i`-th (0 or 1) half-edge of an edge, if present.
    #[inline]
    pub fn edge_half_edge(&self, e: EdgeId, i: usize) -> Option<HalfEdgeId> {
        let he = self.edge(e).half_edges[i];
        he.is_valid().then_some(he)
    }

    /// The two endpoints of an edge, in the direction of its first half-edge.
    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        let he = self.edge(e).half_edges[0];
        [self.source(he), self.target(he)]
    }

    /// Next outgoing half-edge counter-clockwise around the source: `sym(prev(he))`.
    #[inline]
    pub fn vertex_next_ccw_out(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.sym(self.prev(he))
    }

    /// Next outgoing half-edge clockwise around the source: `next(sym(he))`.
    #[inline]
    pub fn vertex_next_clw_out(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.sym(he).map(|s| self.next(s))
    }

    /// Next incoming half-edge counter-clockwise around the target: `prev(sym(he))`.
    #[inline]
    pub fn vertex_next_ccw_in(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.sym(he).map(|s| self.prev(s))
    }

    /// Next incoming half-edge clockwise around the target: `sym(next(he))`.
    #[inline]
    pub fn vertex_next_clw_in(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.sym(self.next(he))
    }

    /// The most clockwise outgoing half-edge: the start of a CCW sweep.
    ///
    /// This is the anchor. For boundary vertices the anchor is made canonical
    /// by [`SurfaceMesh::label_boundary`].
    #[inline]
    pub fn vertex_most_clw_out(&self, v: VertexId) -> HalfEdgeId {
        self.vertex_half_edge(v)
    }

    /// The most counter-clockwise outgoing half-edge: the end of a CCW sweep.
    ///
    /// For an interior vertex this is the half-edge just before the sweep
    /// wraps back to the anchor.
    pub fn vertex_most_ccw_out(&self, v: VertexId) -> HalfEdgeId {
        let start = self.vertex_half_edge(v);
        if !start.is_valid() {
            return start;
        }
        if !self.vertex(v).boundary {
            if let Some(s) = self.sym(start) {
                return self.next(s);
            }
        }
        let mut he = start;
        while let Some(n) = self.vertex_next_ccw_out(he) {
            if n == start {
                break;
            }
            he = n;
        }
        he
    }

    /// The most counter-clockwise incoming half-edge: the start of a CW sweep.
    pub fn vertex_most_ccw_in(&self, v: VertexId) -> HalfEdgeId {
        let he = self.vertex_most_ccw_out(v);
        if he.is_valid() {
            self.prev(he)
        } else {
            he
        }
    }

    /// The most clockwise incoming half-edge: the end of a CW sweep.
    pub fn vertex_most_clw_in(&self, v: VertexId) -> HalfEdgeId {
        let he = self.vertex_most_clw_out(v);
        if he.is_valid() {
            self.prev(he)
        } else {
            he
        }
    }

    /// Find the half-edge from `a` to `b`, if any.
    pub fn vertex_half_edge_to(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.vertex(a)
            .out_half_edges
            .iter()
            .copied()
            .find(|&he| self.target(he) == b)
    }

    /// Check if a half-edge has no opposite half-edge.
    #[inline]
    pub fn is_boundary_half_edge(&self, he: HalfEdgeId) -> bool {
        self.sym(he).is_none()
    }

    /// Check if an edge has a single incident half-edge.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        !self.edge(e).half_edges[1].is_valid()
    }

    /// Check if a vertex is on the boundary: some outgoing half-edge has no sym.
    ///
    /// This inspects the topology; `vertex(v).boundary` is the stored flag
    /// set by [`SurfaceMesh::label_boundary`].
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex(v)
            .out_half_edges
            .iter()
            .any(|&he| self.is_boundary_half_edge(he))
    }

    // ==================== Geometry ====================

    /// Get the three vertices of a triangular face, starting at its anchor.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let he0 = self.face_half_edge(f);
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.source(he0), self.source(he1), self.source(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Compute the unit normal of a face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertices.iter().map(|(_, v)| v.position);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.faces.ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    pub(crate) fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        self.vertices.create(Vertex::new(position))
    }
}
