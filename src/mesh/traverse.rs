//! Traversal iterators for [`SurfaceMesh`].
//!
//! Two families are provided:
//!
//! - **Unordered** iterators walk pool storage order, or a vertex's outgoing
//!   half-edge list as it was built. Use them when rotational order does not
//!   matter.
//! - **Rotational** iterators sweep around a vertex one navigation step at a
//!   time. Around an interior vertex the sweep is a full turn that stops right
//!   before it would revisit the first element. Around a boundary vertex the
//!   fan is open, and it has one more neighbouring vertex (and edge) than
//!   outgoing half-edges, so the vertex and edge sweeps emit one extra element
//!   taken from the half-edge that closes the fan.
//!
//! Every iterator is `Clone`; calling the producing method again restarts the
//! sequence from its canonical first element.

use std::slice;

use super::halfedge::{Edge, Face, HalfEdge, SurfaceMesh, Vertex};
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rotation {
    /// Outgoing half-edges, counter-clockwise.
    Ccw,
    /// Incoming half-edges, clockwise.
    Clw,
}

/// Sweep state shared by the rotational iterators.
#[derive(Clone)]
struct FanWalk<'a> {
    mesh: &'a SurfaceMesh,
    rotation: Rotation,
    current: Option<HalfEdgeId>,
    last: HalfEdgeId,
    close_fan: bool,
    closing: bool,
}

impl<'a> FanWalk<'a> {
    fn new(mesh: &'a SurfaceMesh, v: VertexId, rotation: Rotation, close_fan: bool) -> Self {
        let (first, last) = match rotation {
            Rotation::Ccw => (mesh.vertex_most_clw_out(v), mesh.vertex_most_ccw_out(v)),
            Rotation::Clw => (mesh.vertex_most_ccw_in(v), mesh.vertex_most_clw_in(v)),
        };
        Self {
            mesh,
            rotation,
            current: first.is_valid().then_some(first),
            last,
            close_fan: close_fan && mesh.vertex(v).boundary,
            closing: false,
        }
    }

    fn step(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        match self.rotation {
            Rotation::Ccw => self.mesh.vertex_next_ccw_out(he),
            Rotation::Clw => self.mesh.vertex_next_clw_in(he),
        }
    }

    /// The half-edge on the far boundary edge of an open fan.
    fn closing_half_edge(&self, he: HalfEdgeId) -> HalfEdgeId {
        match self.rotation {
            Rotation::Ccw => self.mesh.prev(he),
            Rotation::Clw => self.mesh.next(he),
        }
    }
}

impl<'a> Iterator for FanWalk<'a> {
    /// The half-edge and whether it is the fan-closing extra element.
    type Item = (HalfEdgeId, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let he = self.current?;
        let closing = self.closing;

        self.current = if closing {
            None
        } else if he == self.last {
            if self.close_fan {
                self.closing = true;
                Some(self.closing_half_edge(he))
            } else {
                None
            }
        } else {
            self.step(he)
        };

        Some((he, closing))
    }
}

/// Rotational iterator over the half-edges around a vertex.
#[derive(Clone)]
pub struct FanHalfEdges<'a> {
    walk: FanWalk<'a>,
}

impl<'a> Iterator for FanHalfEdges<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(he, _)| he)
    }
}

/// Rotational iterator over the neighbouring vertices of a vertex.
#[derive(Clone)]
pub struct FanVertices<'a> {
    walk: FanWalk<'a>,
}

impl<'a> Iterator for FanVertices<'a> {
    type Item = VertexId;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.walk.mesh;
        let (he, closing) = self.walk.next()?;
        // The far end of an incoming half-edge is its source, and vice versa
        let far_is_target = (self.walk.rotation == Rotation::Ccw) != closing;
        Some(if far_is_target {
            mesh.target(he)
        } else {
            mesh.source(he)
        })
    }
}

/// Rotational iterator over the edges incident to a vertex.
#[derive(Clone)]
pub struct FanEdges<'a> {
    walk: FanWalk<'a>,
}

impl<'a> Iterator for FanEdges<'a> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.walk.mesh;
        self.walk.next().map(|(he, _)| mesh.edge_of(he))
    }
}

/// Walk over a vertex's outgoing half-edge list, closing open fans.
///
/// After an outgoing half-edge whose `prev` has no sym, the `prev` itself is
/// emitted so that the neighbour across the boundary edge is not missed.
#[derive(Clone)]
struct OutListWalk<'a> {
    mesh: &'a SurfaceMesh,
    iter: slice::Iter<'a, HalfEdgeId>,
    pending: Option<HalfEdgeId>,
    boundary: bool,
}

impl<'a> OutListWalk<'a> {
    fn new(mesh: &'a SurfaceMesh, v: VertexId) -> Self {
        let vertex = mesh.vertex(v);
        Self {
            mesh,
            iter: vertex.out_half_edges.iter(),
            pending: None,
            boundary: vertex.boundary,
        }
    }
}

impl<'a> Iterator for OutListWalk<'a> {
    type Item = (HalfEdgeId, bool);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(he) = self.pending.take() {
            return Some((he, true));
        }
        let he = *self.iter.next()?;
        if self.boundary {
            let prev = self.mesh.prev(he);
            if self.mesh.sym(prev).is_none() {
                self.pending = Some(prev);
            }
        }
        Some((he, false))
    }
}

/// Unordered iterator over the neighbouring vertices of a vertex.
#[derive(Clone)]
pub struct VertexVertices<'a> {
    walk: OutListWalk<'a>,
}

impl<'a> Iterator for VertexVertices<'a> {
    type Item = VertexId;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.walk.mesh;
        let (he, closing) = self.walk.next()?;
        Some(if closing {
            mesh.source(he)
        } else {
            mesh.target(he)
        })
    }
}

/// Unordered iterator over the edges incident to a vertex.
#[derive(Clone)]
pub struct VertexEdges<'a> {
    walk: OutListWalk<'a>,
}

impl<'a> Iterator for VertexEdges<'a> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.walk.mesh;
        self.walk.next().map(|(he, _)| mesh.edge_of(he))
    }
}

/// Iterator over the half-edges of a face, starting at its anchor.
#[derive(Clone)]
pub struct FaceHalfEdges<'a> {
    mesh: &'a SurfaceMesh,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl<'a> Iterator for FaceHalfEdges<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let he = self.current?;
        let next = self.mesh.next(he);
        self.current = (next != self.start).then_some(next);
        Some(he)
    }
}

impl SurfaceMesh {
    // ==================== Mesh-wide ====================

    /// Iterate over all live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + Clone + '_ {
        self.vertices.ids()
    }

    /// Iterate over all live vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + Clone + '_ {
        self.vertices.iter()
    }

    /// Iterate over all live edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + Clone + '_ {
        self.edges.ids()
    }

    /// Iterate over all live edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + Clone + '_ {
        self.edges.iter()
    }

    /// Iterate over all live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + Clone + '_ {
        self.faces.ids()
    }

    /// Iterate over all live faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + Clone + '_ {
        self.faces.iter()
    }

    /// Iterate over all live half-edge IDs.
    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + Clone + '_ {
        self.half_edges.ids()
    }

    /// Iterate over all live half-edges with their IDs.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + Clone + '_ {
        self.half_edges.iter()
    }

    // ==================== Around a vertex ====================

    /// Outgoing half-edges of a vertex, in the order they were created.
    pub fn vertex_out_half_edges(
        &self,
        v: VertexId,
    ) -> impl Iterator<Item = HalfEdgeId> + Clone + '_ {
        self.vertex(v).out_half_edges.iter().copied()
    }

    /// Neighbouring vertices in incidence order; boundary vertices get both
    /// boundary neighbours.
    pub fn vertex_vertices(&self, v: VertexId) -> VertexVertices<'_> {
        VertexVertices {
            walk: OutListWalk::new(self, v),
        }
    }

    /// Incident edges in incidence order, including the closing boundary edge.
    pub fn vertex_edges(&self, v: VertexId) -> VertexEdges<'_> {
        VertexEdges {
            walk: OutListWalk::new(self, v),
        }
    }

    /// Incident faces in incidence order.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + Clone + '_ {
        self.vertex_out_half_edges(v).map(|he| self.face_of(he))
    }

    /// Outgoing half-edges, counter-clockwise from the most clockwise one.
    pub fn vertex_ccw_out_half_edges(&self, v: VertexId) -> FanHalfEdges<'_> {
        FanHalfEdges {
            walk: FanWalk::new(self, v, Rotation::Ccw, false),
        }
    }

    /// Incoming half-edges, clockwise from the most counter-clockwise one.
    pub fn vertex_clw_in_half_edges(&self, v: VertexId) -> FanHalfEdges<'_> {
        FanHalfEdges {
            walk: FanWalk::new(self, v, Rotation::Clw, false),
        }
    }

    /// Neighbouring vertices counter-clockwise. Yields `valence + 1`
    /// vertices around a boundary vertex.
    pub fn vertex_ccw_vertices(&self, v: VertexId) -> FanVertices<'_> {
        FanVertices {
            walk: FanWalk::new(self, v, Rotation::Ccw, true),
        }
    }

    /// Neighbouring vertices clockwise. Yields `valence + 1` vertices around
    /// a boundary vertex.
    pub fn vertex_clw_vertices(&self, v: VertexId) -> FanVertices<'_> {
        FanVertices {
            walk: FanWalk::new(self, v, Rotation::Clw, true),
        }
    }

    /// Incident edges counter-clockwise, including the closing boundary edge.
    pub fn vertex_ccw_edges(&self, v: VertexId) -> FanEdges<'_> {
        FanEdges {
            walk: FanWalk::new(self, v, Rotation::Ccw, true),
        }
    }

    /// Incident edges clockwise, including the closing boundary edge.
    pub fn vertex_clw_edges(&self, v: VertexId) -> FanEdges<'_> {
        FanEdges {
            walk: FanWalk::new(self, v, Rotation::Clw, true),
        }
    }

    /// Incident faces counter-clockwise.
    pub fn vertex_ccw_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + Clone + '_ {
        self.vertex_ccw_out_half_edges(v).map(|he| self.face_of(he))
    }

    /// Number of outgoing half-edges.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex(v).out_half_edges.len()
    }

    // ==================== Around a face ====================

    /// Half-edges of a face, starting at its anchor.
    pub fn face_half_edges(&self, f: FaceId) -> FaceHalfEdges<'_> {
        let start = self.face_half_edge(f);
        FaceHalfEdges {
            mesh: self,
            start,
            current: start.is_valid().then_some(start),
        }
    }

    /// Vertices of a face (half-edge sources), starting at its anchor.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + Clone + '_ {
        self.face_half_edges(f).map(|he| self.source(he))
    }

    /// Edges of a face, starting at its anchor.
    pub fn face_edges(&self, f: FaceId) -> impl Iterator<Item = EdgeId> + Clone + '_ {
        self.face_half_edges(f).map(|he| self.edge_of(he))
    }
}
