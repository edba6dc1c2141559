//! Connectivity invariant checks.
//!
//! Validation walks every element in parallel with rayon and reports the
//! first broken invariant it finds as `InvalidTopology`. All lookups go
//! through the fallible accessors so a dangling id is reported rather than
//! panicking.

use rayon::prelude::*;

use super::halfedge::SurfaceMesh;
use super::index::{
    EdgeId, FaceId, HalfEdgeId, HalfFaceId, TetEdgeId, TetHalfEdgeId, TetVertexId, VertexId,
};
use crate::error::{MeshError, Result};
use crate::tet::TetMesh;

fn check(ok: bool, details: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(MeshError::topology(details()))
    }
}

impl SurfaceMesh {
    /// Check every half-edge, vertex, edge and face invariant.
    ///
    /// # Errors
    /// `InvalidTopology` describing the first violation found, or
    /// `InvalidId` for a dangling reference.
    pub fn validate(&self) -> Result<()> {
        let half_edges: Vec<HalfEdgeId> = self.half_edge_ids().collect();
        half_edges
            .par_iter()
            .try_for_each(|&he| self.check_half_edge(he))?;

        let vertices: Vec<VertexId> = self.vertex_ids().collect();
        vertices
            .par_iter()
            .try_for_each(|&v| self.check_vertex(v))?;

        let edges: Vec<EdgeId> = self.edge_ids().collect();
        edges.par_iter().try_for_each(|&e| self.check_edge(e))?;

        let faces: Vec<FaceId> = self.face_ids().collect();
        faces.par_iter().try_for_each(|&f| self.check_face(f))?;

        log::debug!(
            "validated surface: {} half-edges, {} vertices",
            half_edges.len(),
            vertices.len()
        );
        Ok(())
    }

    /// Whether [`validate`](Self::validate) succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn check_half_edge(&self, he: HalfEdgeId) -> Result<()> {
        let h = self.try_half_edge(he)?;
        let next = self.try_half_edge(h.next)?;
        let prev = self.try_half_edge(h.prev)?;

        check(next.prev == he && prev.next == he, || {
            format!("{:?}: next/prev are not inverse", he)
        })?;
        check(self.try_half_edge(next.next)?.next == he, || {
            format!("{:?}: face cycle is not a triangle", he)
        })?;
        check(next.source == h.target, || {
            format!("{:?}: next does not start at target", he)
        })?;
        check(next.face == h.face && prev.face == h.face, || {
            format!("{:?}: face cycle spans several faces", he)
        })?;

        let edge = self.try_edge(h.edge)?;
        check(edge.half_edges.contains(&he), || {
            format!("{:?}: not listed by its edge {:?}", he, h.edge)
        })?;

        if let Some(sym) = h.sym {
            let s = self.try_half_edge(sym)?;
            check(s.sym == Some(he), || format!("{:?}: sym is not an involution", he))?;
            check(s.source == h.target && s.target == h.source, || {
                format!("{:?}: sym {:?} is not reversed", he, sym)
            })?;
            check(s.edge == h.edge, || format!("{:?}: sym lies on another edge", he))?;
        }
        Ok(())
    }

    fn check_vertex(&self, v: VertexId) -> Result<()> {
        let vertex = self.try_vertex(v)?;
        check(vertex.halfedge.is_valid(), || format!("{:?} is isolated", v))?;
        let anchor = self.try_half_edge(vertex.halfedge)?;
        check(anchor.source == v, || format!("{:?}: anchor does not start here", v))?;

        for &he in &vertex.out_half_edges {
            check(self.try_half_edge(he)?.source == v, || {
                format!("{:?}: lists foreign outgoing {:?}", v, he)
            })?;
        }

        check(vertex.boundary == self.is_boundary_vertex(v), || {
            format!("{:?}: boundary flag disagrees with topology", v)
        })?;
        if vertex.boundary {
            check(anchor.sym.is_none(), || {
                format!("{:?}: boundary anchor is not most clockwise", v)
            })?;
        }
        check(self.is_single_fan(v), || {
            format!("{:?}: outgoing half-edges form more than one fan", v)
        })
    }

    fn check_edge(&self, e: EdgeId) -> Result<()> {
        let edge = self.try_edge(e)?;
        let [first, second] = edge.half_edges;
        check(first.is_valid(), || format!("{:?} has no half-edge", e))?;
        check(edge.boundary == !second.is_valid(), || {
            format!("{:?}: boundary flag disagrees with topology", e)
        })?;
        if second.is_valid() {
            check(self.try_half_edge(first)?.sym == Some(second), || {
                format!("{:?}: half-edges are not syms", e)
            })?;
        }
        Ok(())
    }

    fn check_face(&self, f: FaceId) -> Result<()> {
        let face = self.try_face(f)?;
        check(self.try_half_edge(face.halfedge)?.face == f, || {
            format!("{:?}: anchor belongs to another face", f)
        })?;
        let on_boundary = self
            .face_half_edges(f)
            .any(|he| self.is_boundary_half_edge(he));
        check(face.boundary == on_boundary, || {
            format!("{:?}: boundary flag disagrees with topology", f)
        })
    }
}

impl TetMesh {
    /// Check every element invariant, rejecting isolated vertices.
    ///
    /// # Errors
    /// `InvalidTopology` describing the first violation found, or
    /// `IsolatedVertex` for a vertex no tet uses.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(false)
    }

    /// Check every element invariant, optionally tolerating vertices no tet
    /// uses (as loaded with `allow_isolated_vertices`).
    ///
    /// # Errors
    /// As [`validate`](Self::validate); `IsolatedVertex` only when
    /// `allow_isolated_vertices` is false.
    pub fn validate_with(&self, allow_isolated_vertices: bool) -> Result<()> {
        let half_edges: Vec<TetHalfEdgeId> = self.half_edges().map(|(id, _)| id).collect();
        half_edges
            .par_iter()
            .try_for_each(|&he| self.check_half_edge(he))?;

        let half_faces: Vec<HalfFaceId> = self.half_faces().map(|(id, _)| id).collect();
        half_faces
            .par_iter()
            .try_for_each(|&hf| self.check_half_face(hf))?;

        let vertices: Vec<TetVertexId> = self.vertex_ids().collect();
        vertices
            .par_iter()
            .try_for_each(|&v| self.check_vertex(v, allow_isolated_vertices))?;

        let edges: Vec<TetEdgeId> = self.edges.ids().collect();
        edges.par_iter().try_for_each(|&e| self.check_edge(e))?;

        log::debug!(
            "validated tet mesh: {} half-edges, {} half-faces, {} vertices",
            half_edges.len(),
            half_faces.len(),
            vertices.len()
        );
        Ok(())
    }

    /// Whether [`validate`](Self::validate) succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn check_vertex(&self, v: TetVertexId, allow_isolated: bool) -> Result<()> {
        let vertex = self.vertices.get(v)?;
        if vertex.tets.is_empty() && !allow_isolated {
            return Err(MeshError::IsolatedVertex { vertex: v.index() });
        }

        let mut on_boundary = false;
        for &t in &vertex.tets {
            let tet = self.tets.get(t)?;
            check(tet.vertices.contains(&v), || {
                format!("{:?}: lists {:?} which does not use it", v, t)
            })?;
            for &hf in &tet.half_faces {
                let half_face = self.half_faces.get(hf)?;
                if half_face.vertices.contains(&v) && self.is_boundary_half_face(hf) {
                    on_boundary = true;
                }
            }
        }
        check(vertex.boundary == on_boundary, || {
            format!("{:?}: boundary flag disagrees with topology", v)
        })
    }

    fn check_edge(&self, e: TetEdgeId) -> Result<()> {
        let edge = self.edges.get(e)?;
        check(!edge.half_edges.is_empty(), || format!("{:?} has no half-edge", e))?;

        let mut on_boundary = false;
        for &he in &edge.half_edges {
            let h = self.half_edges.get(he)?;
            check(h.edge == e, || format!("{:?}: lists foreign {:?}", e, he))?;
            self.half_faces.get(h.half_face)?;
            on_boundary |= self.is_boundary_half_face(h.half_face);
        }
        check(edge.boundary == on_boundary, || {
            format!("{:?}: boundary flag disagrees with topology", e)
        })
    }

    fn check_half_edge(&self, he: TetHalfEdgeId) -> Result<()> {
        let h = self.half_edges.get(he)?;
        let next = self.half_edges.get(h.next)?;
        let prev = self.half_edges.get(h.prev)?;
        check(next.prev == he && prev.next == he, || {
            format!("{:?}: next/prev are not inverse", he)
        })?;
        check(next.source == h.target, || {
            format!("{:?}: next does not start at target", he)
        })?;
        check(next.half_face == h.half_face, || {
            format!("{:?}: cycle spans several half-faces", he)
        })?;

        let dual = self.half_edges.get(h.dual)?;
        check(dual.dual == he, || format!("{:?}: dual is not an involution", he))?;
        check(dual.source == h.target && dual.target == h.source, || {
            format!("{:?}: dual is not reversed", he)
        })?;
        check(dual.half_face != h.half_face, || {
            format!("{:?}: dual lies on the same half-face", he)
        })?;
        let tet = self.half_faces.get(h.half_face)?.tet;
        check(self.half_faces.get(dual.half_face)?.tet == tet, || {
            format!("{:?}: dual belongs to another tet", he)
        })?;

        let edge = self.edges.get(h.edge)?;
        let mut ends = [h.source, h.target];
        ends.sort_unstable();
        check(edge.vertices == ends, || {
            format!("{:?}: endpoints differ from edge {:?}", he, h.edge)
        })
    }

    fn check_half_face(&self, hf: HalfFaceId) -> Result<()> {
        let half_face = self.half_faces.get(hf)?;
        let sources: Vec<_> = self
            .half_face_half_edges(hf)
            .take(4)
            .map(|he| self.half_edge_source(he))
            .collect();
        check(sources.len() == 3, || format!("{:?}: cycle is not a triangle", hf))?;
        check(sources == half_face.vertices, || {
            format!("{:?}: vertex list disagrees with its cycle", hf)
        })?;

        let face = self.faces.get(half_face.face)?;
        check(face.half_faces.contains(&hf), || {
            format!("{:?}: not listed by its face", hf)
        })?;
        check(face.boundary == !face.half_faces[1].is_valid(), || {
            format!("{:?}: boundary flag disagrees with topology", half_face.face)
        })?;

        if let Some(twin) = self.half_face_twin(hf) {
            let other = self.half_faces.get(twin)?;
            check(other.tet != half_face.tet, || {
                format!("{:?}: twin belongs to the same tet", hf)
            })?;
            let [a, b, c] = half_face.vertices;
            let reversed = [[a, c, b], [c, b, a], [b, a, c]];
            check(reversed.contains(&other.vertices), || {
                format!("{:?}: twin {:?} is not oppositely wound", hf, twin)
            })?;
        }
        Ok(())
    }
}
