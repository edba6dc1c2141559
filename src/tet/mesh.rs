//! Tetrahedral mesh data structure.
//!
//! A [`TetMesh`] owns one positions buffer and one buffer of tet vertex
//! quadruples, plus a [`Pool`] per element kind:
//!
//! - every tet has four **half-faces**, each a triangle of three
//!   **half-edges** linked in a `next`/`prev` cycle and wound outwards
//! - a **face** is the triangle shared by one half-face (boundary) or two
//!   half-faces from neighbouring tets; the two are each other's **twin**
//! - an **edge** is shared by every tet around it and lists all the tet
//!   half-edges lying on it
//! - inside a tet, every half-edge has a **dual**: the opposite half-edge on
//!   the neighbouring half-face of the same tet
//!
//! Vertices keep the incident tet and edge lists gathered during
//! construction.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::mesh::index::{HalfFaceId, TetEdgeId, TetFaceId, TetHalfEdgeId, TetId, TetVertexId};
use crate::mesh::Pool;

/// A vertex of the tet mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Column of this vertex in the mesh positions buffer.
    pub position: usize,

    /// Whether the vertex lies on a boundary face.
    pub boundary: bool,

    pub(crate) tets: Vec<TetId>,
    pub(crate) edges: Vec<TetEdgeId>,
}

/// A directed edge of one half-face.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// Start vertex.
    pub source: TetVertexId,
    /// End vertex.
    pub target: TetVertexId,
    /// Next half-edge around the half-face.
    pub next: TetHalfEdgeId,
    /// Previous half-edge around the half-face.
    pub prev: TetHalfEdgeId,
    /// Opposite half-edge on the adjacent half-face of the same tet.
    pub dual: TetHalfEdgeId,
    /// Owning half-face.
    pub half_face: HalfFaceId,
    /// The shared edge.
    pub edge: TetEdgeId,
}

/// One oriented side of a triangle, owned by a single tet.
#[derive(Debug, Clone, Copy)]
pub struct HalfFace {
    /// Anchor half-edge; `vertices[0]` is its source.
    pub halfedge: TetHalfEdgeId,
    /// Owning tet.
    pub tet: TetId,
    /// The shared face.
    pub face: TetFaceId,
    /// Vertices in winding order (outward for a positively oriented tet).
    pub vertices: [TetVertexId; 3],
}

/// A triangle, shared by one or two half-faces.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// Incident half-faces; the second is invalid on the boundary.
    pub half_faces: [HalfFaceId; 2],
    /// Whether only one tet touches this face.
    pub boundary: bool,
    /// Sorted vertex triple identifying the face.
    pub key: [TetVertexId; 3],
}

/// An edge, shared by every tet around it.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Sorted endpoints.
    pub vertices: [TetVertexId; 2],
    /// Whether the edge lies on a boundary face.
    pub boundary: bool,
    pub(crate) half_edges: Vec<TetHalfEdgeId>,
}

/// A tetrahedron.
#[derive(Debug, Clone, Copy)]
pub struct Tet {
    /// Vertices in stored order.
    pub vertices: [TetVertexId; 4],
    /// Half-faces; `half_faces[i]` is opposite `vertices[i]`.
    pub half_faces: [HalfFaceId; 4],
    /// Edges, in the order `01, 02, 03, 12, 13, 23`.
    pub edges: [TetEdgeId; 6],
}

/// A tetrahedral mesh with half-face connectivity.
#[derive(Debug, Clone, Default)]
pub struct TetMesh {
    pub(crate) positions: Vec<Point3<f64>>,
    pub(crate) tet_vertex_ids: Vec<[usize; 4]>,

    pub(crate) vertices: Pool<Vertex, TetVertexId>,
    pub(crate) edges: Pool<Edge, TetEdgeId>,
    pub(crate) faces: Pool<Face, TetFaceId>,
    pub(crate) half_faces: Pool<HalfFace, HalfFaceId>,
    pub(crate) half_edges: Pool<HalfEdge, TetHalfEdgeId>,
    pub(crate) tets: Pool<Tet, TetId>,

    pub(crate) edge_lookup: HashMap<[TetVertexId; 2], TetEdgeId>,
    pub(crate) face_lookup: HashMap<[TetVertexId; 3], TetFaceId>,
}

impl TetMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_tets: usize) -> Self {
        // Rough counts for a typical mesh: F ~ 2T, E ~ 1.2T
        let num_faces = num_tets * 2 + 4;
        let num_edges = num_tets * 6 / 5 + num_vertices;
        Self {
            positions: Vec::with_capacity(num_vertices),
            tet_vertex_ids: Vec::with_capacity(num_tets),
            vertices: Pool::with_capacity(num_vertices),
            edges: Pool::with_capacity(num_edges),
            faces: Pool::with_capacity(num_faces),
            half_faces: Pool::with_capacity(num_tets * 4),
            half_edges: Pool::with_capacity(num_tets * 12),
            tets: Pool::with_capacity(num_tets),
            edge_lookup: HashMap::with_capacity(num_edges),
            face_lookup: HashMap::with_capacity(num_faces),
        }
    }

    /// Add a vertex at `position` and return its ID.
    ///
    /// The position is appended to the positions buffer; the new vertex
    /// stores its column.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> TetVertexId {
        let column = self.positions.len();
        self.positions.push(position);
        self.vertices.create(Vertex {
            position: column,
            boundary: false,
            tets: Vec::new(),
            edges: Vec::new(),
        })
    }

    /// Release excess capacity after construction.
    pub fn shrink_to_fit(&mut self) {
        for (_, v) in self.vertices.iter_mut() {
            v.tets.shrink_to_fit();
            v.edges.shrink_to_fit();
        }
        for (_, e) in self.edges.iter_mut() {
            e.half_edges.shrink_to_fit();
        }
        self.positions.shrink_to_fit();
        self.tet_vertex_ids.shrink_to_fit();
    }

    // ==================== Accessors ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of live half-faces.
    #[inline]
    pub fn num_half_faces(&self) -> usize {
        self.half_faces.len()
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_half_edges(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of live tets.
    #[inline]
    pub fn num_tets(&self) -> usize {
        self.tets.len()
    }

    /// All vertex positions, indexed by `Vertex::position`.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Stored vertex quadruple of every tet, indexed by tet id.
    #[inline]
    pub fn tet_vertex_ids(&self) -> &[[usize; 4]] {
        &self.tet_vertex_ids
    }

    /// The vertex pool.
    #[inline]
    pub fn vertex_pool(&self) -> &Pool<Vertex, TetVertexId> {
        &self.vertices
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: TetVertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Get a vertex, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_vertex(&self, id: TetVertexId) -> Result<&Vertex> {
        self.vertices.get(id)
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: TetEdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: TetFaceId) -> &Face {
        &self.faces[id]
    }

    /// Get a half-face by ID.
    #[inline]
    pub fn half_face(&self, id: HalfFaceId) -> &HalfFace {
        &self.half_faces[id]
    }

    /// Get a half-face, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_half_face(&self, id: HalfFaceId) -> Result<&HalfFace> {
        self.half_faces.get(id)
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn half_edge(&self, id: TetHalfEdgeId) -> &HalfEdge {
        &self.half_edges[id]
    }

    /// Get a tet by ID.
    #[inline]
    pub fn tet(&self, id: TetId) -> &Tet {
        &self.tets[id]
    }

    /// Get a tet, failing with `InvalidId` if it does not exist.
    #[inline]
    pub fn try_tet(&self, id: TetId) -> Result<&Tet> {
        self.tets.get(id)
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: TetVertexId) -> &Point3<f64> {
        &self.positions[self.vertex(v).position]
    }

    // ==================== Topology Queries ====================

    /// Source vertex of a half-edge.
    #[inline]
    pub fn half_edge_source(&self, he: TetHalfEdgeId) -> TetVertexId {
        self.half_edge(he).source
    }

    /// Target vertex of a half-edge.
    #[inline]
    pub fn half_edge_target(&self, he: TetHalfEdgeId) -> TetVertexId {
        self.half_edge(he).target
    }

    /// Next half-edge around its half-face.
    #[inline]
    pub fn half_edge_next(&self, he: TetHalfEdgeId) -> TetHalfEdgeId {
        self.half_edge(he).next
    }

    /// Previous half-edge around its half-face.
    #[inline]
    pub fn half_edge_prev(&self, he: TetHalfEdgeId) -> TetHalfEdgeId {
        self.half_edge(he).prev
    }

    /// Opposite half-edge inside the same tet.
    #[inline]
    pub fn half_edge_dual(&self, he: TetHalfEdgeId) -> TetHalfEdgeId {
        self.half_edge(he).dual
    }

    /// Half-face owning a half-edge.
    #[inline]
    pub fn half_edge_half_face(&self, he: TetHalfEdgeId) -> HalfFaceId {
        self.half_edge(he).half_face
    }

    /// Edge a half-edge lies on.
    #[inline]
    pub fn half_edge_edge(&self, he: TetHalfEdgeId) -> TetEdgeId {
        self.half_edge(he).edge
    }

    /// Tet a half-edge belongs to.
    #[inline]
    pub fn half_edge_tet(&self, he: TetHalfEdgeId) -> TetId {
        self.half_face_tet(self.half_edge_half_face(he))
    }

    /// Anchor half-edge of a half-face.
    #[inline]
    pub fn half_face_half_edge(&self, hf: HalfFaceId) -> TetHalfEdgeId {
        self.half_face(hf).halfedge
    }

    /// Tet owning a half-face.
    #[inline]
    pub fn half_face_tet(&self, hf: HalfFaceId) -> TetId {
        self.half_face(hf).tet
    }

    /// Face a half-face lies on.
    #[inline]
    pub fn half_face_face(&self, hf: HalfFaceId) -> TetFaceId {
        self.half_face(hf).face
    }

    /// Vertices of a half-face in winding order.
    #[inline]
    pub fn half_face_vertices(&self, hf: HalfFaceId) -> [TetVertexId; 3] {
        self.half_face(hf).vertices
    }

    /// The half-face on the other side of the shared triangle, if any.
    pub fn half_face_twin(&self, hf: HalfFaceId) -> Option<HalfFaceId> {
        let [a, b] = self.face(self.half_face_face(hf)).half_faces;
        let other = if a == hf { b } else { a };
        other.is_valid().then_some(other)
    }

    /// Whether a half-face lies on the domain boundary.
    #[inline]
    pub fn is_boundary_half_face(&self, hf: HalfFaceId) -> bool {
        self.half_face_twin(hf).is_none()
    }

    /// The half-faces of a face; the second is `None` on the boundary.
    pub fn face_half_faces(&self, f: TetFaceId) -> (HalfFaceId, Option<HalfFaceId>) {
        let [a, b] = self.face(f).half_faces;
        (a, b.is_valid().then_some(b))
    }

    /// Endpoints of an edge, sorted.
    #[inline]
    pub fn edge_vertices(&self, e: TetEdgeId) -> [TetVertexId; 2] {
        self.edge(e).vertices
    }

    /// Find the edge joining `a` and `b`, if any.
    pub fn vertex_edge_to(&self, a: TetVertexId, b: TetVertexId) -> Option<TetEdgeId> {
        self.edge_lookup.get(&sorted_pair(a, b)).copied()
    }

    /// Find the face spanned by three vertices, in any order.
    pub fn find_face(&self, vs: [TetVertexId; 3]) -> Option<TetFaceId> {
        self.face_lookup.get(&sorted_triple(vs)).copied()
    }

    /// Vertices of a tet in stored order.
    #[inline]
    pub fn tet_vertices(&self, t: TetId) -> [TetVertexId; 4] {
        self.tet(t).vertices
    }

    /// Half-faces of a tet; `i`-th is opposite the `i`-th vertex.
    #[inline]
    pub fn tet_half_faces(&self, t: TetId) -> [HalfFaceId; 4] {
        self.tet(t).half_faces
    }

    /// Edges of a tet.
    #[inline]
    pub fn tet_edges(&self, t: TetId) -> [TetEdgeId; 6] {
        self.tet(t).edges
    }

    // ==================== Iteration ====================

    /// Iterate over all live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = TetVertexId> + Clone + '_ {
        self.vertices.ids()
    }

    /// Iterate over all live vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (TetVertexId, &Vertex)> + Clone + '_ {
        self.vertices.iter()
    }

    /// Iterate over all live edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (TetEdgeId, &Edge)> + Clone + '_ {
        self.edges.iter()
    }

    /// Iterate over all live faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (TetFaceId, &Face)> + Clone + '_ {
        self.faces.iter()
    }

    /// Iterate over all live half-faces with their IDs.
    pub fn half_faces(&self) -> impl Iterator<Item = (HalfFaceId, &HalfFace)> + Clone + '_ {
        self.half_faces.iter()
    }

    /// Iterate over all live half-edges with their IDs.
    pub fn half_edges(&self) -> impl Iterator<Item = (TetHalfEdgeId, &HalfEdge)> + Clone + '_ {
        self.half_edges.iter()
    }

    /// Iterate over all live tet IDs.
    pub fn tet_ids(&self) -> impl Iterator<Item = TetId> + Clone + '_ {
        self.tets.ids()
    }

    /// Iterate over all live tets with their IDs.
    pub fn tets(&self) -> impl Iterator<Item = (TetId, &Tet)> + Clone + '_ {
        self.tets.iter()
    }

    /// Half-edges of a half-face, starting at its anchor.
    pub fn half_face_half_edges(
        &self,
        hf: HalfFaceId,
    ) -> impl Iterator<Item = TetHalfEdgeId> + Clone + '_ {
        let start = self.half_face_half_edge(hf);
        std::iter::successors(Some(start), move |&he| {
            let next = self.half_edge_next(he);
            (next != start).then_some(next)
        })
    }

    /// Tets incident to a vertex.
    pub fn vertex_tets(&self, v: TetVertexId) -> impl Iterator<Item = TetId> + Clone + '_ {
        self.vertex(v).tets.iter().copied()
    }

    /// Edges incident to a vertex.
    pub fn vertex_edges(&self, v: TetVertexId) -> impl Iterator<Item = TetEdgeId> + Clone + '_ {
        self.vertex(v).edges.iter().copied()
    }

    /// Tet half-edges lying on an edge (two per incident tet).
    pub fn edge_half_edges(
        &self,
        e: TetEdgeId,
    ) -> impl Iterator<Item = TetHalfEdgeId> + Clone + '_ {
        self.edge(e).half_edges.iter().copied()
    }

    /// Tets incident to an edge, each reported once.
    pub fn edge_tets(&self, e: TetEdgeId) -> Vec<TetId> {
        let mut tets: Vec<TetId> = self
            .edge_half_edges(e)
            .map(|he| self.half_edge_tet(he))
            .collect();
        tets.sort_unstable();
        tets.dedup();
        tets
    }

    /// Vertices flagged boundary, in id order.
    pub fn boundary_vertices(&self) -> impl Iterator<Item = TetVertexId> + Clone + '_ {
        self.vertices
            .iter()
            .filter(|(_, v)| v.boundary)
            .map(|(id, _)| id)
    }

    /// Half-faces without a twin, in id order.
    pub fn boundary_half_faces(&self) -> impl Iterator<Item = HalfFaceId> + Clone + '_ {
        self.half_faces
            .ids()
            .filter(move |&hf| self.is_boundary_half_face(hf))
    }

    // ==================== Geometry ====================

    /// Signed volume of a tet in stored vertex order.
    pub fn tet_volume(&self, t: TetId) -> f64 {
        let [a, b, c, d] = self.tet_vertices(t);
        super::signed_volume(
            self.position(a),
            self.position(b),
            self.position(c),
            self.position(d),
        )
    }

    /// Total signed volume of the mesh.
    pub fn total_volume(&self) -> f64 {
        self.tet_ids().map(|t| self.tet_volume(t)).sum()
    }

    /// Unit normal of a half-face from its winding.
    pub fn half_face_normal(&self, hf: HalfFaceId) -> Vector3<f64> {
        let [a, b, c] = self.half_face_vertices(hf);
        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        (pb - pa).cross(&(pc - pa)).normalize()
    }

    /// Area of a half-face.
    pub fn half_face_area(&self, hf: HalfFaceId) -> f64 {
        let [a, b, c] = self.half_face_vertices(hf);
        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        0.5 * (pb - pa).cross(&(pc - pa)).norm()
    }

    /// Total area of the boundary half-faces.
    pub fn boundary_area(&self) -> f64 {
        self.boundary_half_faces().map(|hf| self.half_face_area(hf)).sum()
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertex_ids().map(|v| *self.position(v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }
}

pub(crate) fn sorted_pair(a: TetVertexId, b: TetVertexId) -> [TetVertexId; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

pub(crate) fn sorted_triple(mut vs: [TetVertexId; 3]) -> [TetVertexId; 3] {
    vs.sort_unstable();
    vs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vertex_records_column() {
        let mut mesh = TetMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 2.0, 3.0));

        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(mesh.vertex(b).position, 1);
        assert_eq!(*mesh.position(b), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.positions().len(), 2);
        assert!(mesh.try_vertex(TetVertexId::new(9)).is_err());
        assert!(!mesh.vertex(a).boundary);
    }

    #[test]
    fn test_sorted_keys() {
        let (a, b, c) = (TetVertexId::new(5), TetVertexId::new(1), TetVertexId::new(3));
        assert_eq!(sorted_pair(a, b), [b, a]);
        assert_eq!(sorted_triple([a, b, c]), [b, c, a]);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TetMesh::new();
        assert_eq!(mesh.num_tets(), 0);
        assert_eq!(mesh.total_volume(), 0.0);
        assert!(mesh.bounding_box().is_none());
    }
}
