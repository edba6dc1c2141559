//! Tet construction and boundary labeling.
//!
//! Each tet is added with its four half-faces and twelve half-edges. Edges
//! and faces shared with earlier tets are found through the mesh's sorted-key
//! lookup tables, so a triangle touched by two tets ends up with both
//! half-faces as twins.

use nalgebra::Point3;

use super::mesh::{sorted_pair, sorted_triple, Edge, Face, HalfEdge, HalfFace, Tet, TetMesh};
use crate::error::{MeshError, Result};
use crate::mesh::index::{HalfFaceId, TetEdgeId, TetFaceId, TetHalfEdgeId, TetId, TetVertexId};

/// Corner indices of the half-face opposite each tet vertex.
///
/// Every triple winds outwards when the tet has positive signed volume.
pub const TET_FACES: [[usize; 3]; 4] = [[1, 2, 3], [2, 0, 3], [0, 1, 3], [1, 0, 2]];

/// Corner pairs of the six tet edges.
pub const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Volume at or below which an orientation-checked tet is rejected as flat.
pub const DEFAULT_DEGENERATE_VOLUME: f64 = 1e-12;

/// Signed volume of the tet `(a, b, c, d)`.
///
/// Positive when `d` lies on the side of triangle `(a, b, c)` its
/// counter-clockwise normal points to.
pub fn signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

impl TetMesh {
    /// Add a tet over four existing vertices, in the given order.
    ///
    /// # Errors
    /// - `InvalidId` if a vertex does not exist
    /// - `DegenerateTet` if a vertex is repeated
    /// - `NonManifoldFace` if a triangle is already shared by two tets
    pub fn construct_tet(&mut self, vertex_ids: [usize; 4]) -> Result<TetId> {
        self.check_tet_vertices(vertex_ids)?;
        self.build_tet(vertex_ids)
    }

    /// Add a tet, swapping its first two vertices if needed so that it has
    /// positive volume.
    ///
    /// Uses [`DEFAULT_DEGENERATE_VOLUME`] as the flatness threshold.
    pub fn construct_tet_with_orientation(&mut self, vertex_ids: [usize; 4]) -> Result<TetId> {
        self.construct_tet_with_min_volume(vertex_ids, DEFAULT_DEGENERATE_VOLUME)
    }

    /// Add a tet with orientation repair and an explicit flatness threshold.
    ///
    /// # Errors
    /// As [`construct_tet`](Self::construct_tet), plus `DegenerateTet` if
    /// the absolute volume is at most `min_volume` or is not finite.
    pub fn construct_tet_with_min_volume(
        &mut self,
        mut vertex_ids: [usize; 4],
        min_volume: f64,
    ) -> Result<TetId> {
        self.check_tet_vertices(vertex_ids)?;

        let [a, b, c, d] = vertex_ids.map(|i| *self.position(TetVertexId::new(i)));
        let volume = signed_volume(&a, &b, &c, &d);
        // NaN and infinite volumes fail this too
        if !(volume.abs() > min_volume && volume.is_finite()) {
            return Err(MeshError::DegenerateTet {
                vertices: vertex_ids,
                reason: "zero volume",
            });
        }
        if volume < 0.0 {
            log::trace!("flipping inverted tet {:?}", vertex_ids);
            vertex_ids.swap(0, 1);
        }
        self.build_tet(vertex_ids)
    }

    fn check_tet_vertices(&self, vertex_ids: [usize; 4]) -> Result<()> {
        for &i in &vertex_ids {
            self.try_vertex(TetVertexId::new(i))?;
        }
        for i in 0..4 {
            for j in (i + 1)..4 {
                if vertex_ids[i] == vertex_ids[j] {
                    return Err(MeshError::DegenerateTet {
                        vertices: vertex_ids,
                        reason: "repeated vertex",
                    });
                }
            }
        }
        Ok(())
    }

    fn build_tet(&mut self, vertex_ids: [usize; 4]) -> Result<TetId> {
        let vs = vertex_ids.map(TetVertexId::new);

        // Reject before mutating so a failed tet leaves the mesh untouched
        for corners in &TET_FACES {
            let key = sorted_triple(corners.map(|c| vs[c]));
            if let Some(&f) = self.face_lookup.get(&key) {
                if self.faces[f].half_faces[1].is_valid() {
                    return Err(MeshError::NonManifoldFace {
                        vertices: key.map(|v| v.index()),
                    });
                }
            }
        }

        let tet = self.tets.create(Tet {
            vertices: vs,
            half_faces: [HalfFaceId::invalid(); 4],
            edges: [TetEdgeId::invalid(); 6],
        });

        let mut tet_half_edges = Vec::with_capacity(12);
        for (slot, corners) in TET_FACES.iter().enumerate() {
            let hf_vertices = corners.map(|c| vs[c]);
            let hf = self.add_half_face(tet, hf_vertices);
            self.tets[tet].half_faces[slot] = hf;
            tet_half_edges.extend(self.half_face_half_edges(hf));
        }

        // Each directed edge of a tet appears once, its reverse once
        for &he in &tet_half_edges {
            let HalfEdge { source, target, .. } = self.half_edges[he];
            let dual = tet_half_edges
                .iter()
                .copied()
                .find(|&o| self.half_edges[o].source == target && self.half_edges[o].target == source)
                .ok_or_else(|| MeshError::topology(format!("tet {:?}: no dual for {:?}", tet, he)))?;
            self.half_edges[he].dual = dual;
        }

        for (slot, [i, j]) in TET_EDGES.iter().enumerate() {
            let e = self.resolve_edge(vs[*i], vs[*j]);
            self.tets[tet].edges[slot] = e;
        }

        for &v in &vs {
            self.vertices[v].tets.push(tet);
        }
        self.tet_vertex_ids.push(vertex_ids);

        Ok(tet)
    }

    fn add_half_face(&mut self, tet: TetId, vs: [TetVertexId; 3]) -> HalfFaceId {
        let hf = self.half_faces.create(HalfFace {
            halfedge: TetHalfEdgeId::invalid(),
            tet,
            face: TetFaceId::invalid(),
            vertices: vs,
        });

        let hes: [TetHalfEdgeId; 3] = std::array::from_fn(|i| {
            self.half_edges.create(HalfEdge {
                source: vs[i],
                target: vs[(i + 1) % 3],
                next: TetHalfEdgeId::invalid(),
                prev: TetHalfEdgeId::invalid(),
                dual: TetHalfEdgeId::invalid(),
                half_face: hf,
                edge: TetEdgeId::invalid(),
            })
        });
        for i in 0..3 {
            let edge = self.resolve_edge(vs[i], vs[(i + 1) % 3]);
            let h = &mut self.half_edges[hes[i]];
            h.next = hes[(i + 1) % 3];
            h.prev = hes[(i + 2) % 3];
            h.edge = edge;
            self.edges[edge].half_edges.push(hes[i]);
        }

        let key = sorted_triple(vs);
        let face = match self.face_lookup.get(&key) {
            Some(&f) => {
                self.faces[f].half_faces[1] = hf;
                f
            }
            None => {
                let f = self.faces.create(Face {
                    half_faces: [hf, HalfFaceId::invalid()],
                    boundary: false,
                    key,
                });
                self.face_lookup.insert(key, f);
                f
            }
        };

        let h = &mut self.half_faces[hf];
        h.halfedge = hes[0];
        h.face = face;
        hf
    }

    /// Find the edge joining `a` and `b`, creating it if absent.
    fn resolve_edge(&mut self, a: TetVertexId, b: TetVertexId) -> TetEdgeId {
        let key = sorted_pair(a, b);
        if let Some(&e) = self.edge_lookup.get(&key) {
            return e;
        }
        let e = self.edges.create(Edge {
            vertices: key,
            boundary: false,
            half_edges: Vec::new(),
        });
        self.edge_lookup.insert(key, e);
        self.vertices[a].edges.push(e);
        self.vertices[b].edges.push(e);
        e
    }

    /// Flag faces with a single half-face as boundary, along with their
    /// edges and vertices. Running this twice gives the same result.
    pub fn label_boundary(&mut self) {
        for (_, v) in self.vertices.iter_mut() {
            v.boundary = false;
        }
        for (_, e) in self.edges.iter_mut() {
            e.boundary = false;
        }

        let mut boundary = Vec::new();
        for (_, f) in self.faces.iter_mut() {
            f.boundary = !f.half_faces[1].is_valid();
            if f.boundary {
                boundary.push(f.half_faces[0]);
            }
        }

        for &hf in &boundary {
            let start = self.half_faces[hf].halfedge;
            let mut he = start;
            loop {
                let HalfEdge {
                    source, edge, next, ..
                } = self.half_edges[he];
                self.vertices[source].boundary = true;
                self.edges[edge].boundary = true;
                he = next;
                if he == start {
                    break;
                }
            }
        }

        log::debug!("labeled tet boundary: {} faces", boundary.len());
    }

    /// Vertices not referenced by any tet.
    pub fn isolated_vertices(&self) -> Vec<TetVertexId> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.tets.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Fail with `IsolatedVertex` for the first vertex no tet references.
    pub fn check_isolated_vertices(&self) -> Result<()> {
        match self.isolated_vertices().first() {
            Some(v) => Err(MeshError::IsolatedVertex { vertex: v.index() }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn unit_tet_positions() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    pub(crate) fn mesh_with(positions: &[Point3<f64>], tets: &[[usize; 4]]) -> TetMesh {
        let mut mesh = TetMesh::with_capacity(positions.len(), tets.len());
        for &p in positions {
            mesh.add_vertex(p);
        }
        for &t in tets {
            mesh.construct_tet_with_orientation(t).unwrap();
        }
        mesh.label_boundary();
        mesh
    }

    pub(crate) fn single_tet() -> TetMesh {
        mesh_with(&unit_tet_positions(), &[[0, 1, 2, 3]])
    }

    /// Two tets glued along triangle 1-2-3.
    pub(crate) fn tet_pair() -> TetMesh {
        let mut positions = unit_tet_positions();
        positions.push(Point3::new(1.0, 1.0, 1.0));
        mesh_with(&positions, &[[0, 1, 2, 3], [4, 2, 1, 3]])
    }

    /// The unit tet split into four around its centroid, which is vertex 0
    /// and lies strictly inside.
    pub(crate) fn split_tet() -> TetMesh {
        let mut positions = vec![Point3::new(0.25, 0.25, 0.25)];
        positions.extend(unit_tet_positions());
        mesh_with(
            &positions,
            &[[2, 3, 4, 0], [3, 1, 4, 0], [1, 2, 4, 0], [2, 1, 3, 0]],
        )
    }

    /// Two tets touching only at vertex 0.
    pub(crate) fn bowtie() -> TetMesh {
        let mut positions = unit_tet_positions();
        positions.extend([
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
        ]);
        mesh_with(&positions, &[[0, 1, 2, 3], [0, 4, 5, 6]])
    }

    #[test]
    fn test_split_tet_counts() {
        let mesh = split_tet();
        assert_eq!(mesh.num_tets(), 4);
        assert_eq!(mesh.num_faces(), 10);
        assert_eq!(mesh.num_edges(), 10);
        assert_eq!(mesh.boundary_half_faces().count(), 4);
        assert!(!mesh.vertex(TetVertexId::new(0)).boundary);
        assert!((mesh.total_volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_volume() {
        let p = unit_tet_positions();
        assert!((signed_volume(&p[0], &p[1], &p[2], &p[3]) - 1.0 / 6.0).abs() < 1e-12);
        assert!((signed_volume(&p[1], &p[0], &p[2], &p[3]) + 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_tet_counts() {
        let mesh = single_tet();
        assert_eq!(mesh.num_tets(), 1);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_half_faces(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_half_edges(), 12);

        assert!(mesh.faces().all(|(_, f)| f.boundary));
        assert!(mesh.edges().all(|(_, e)| e.boundary));
        assert!(mesh.vertices().all(|(_, v)| v.boundary));
        assert_eq!(mesh.tet_vertex_ids(), &[[0, 1, 2, 3]]);
    }

    #[test]
    fn test_half_faces_wind_outwards() {
        let mesh = single_tet();
        let t = TetId::new(0);
        let centroid = mesh
            .tet_vertices(t)
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, &v| acc + mesh.position(v).coords)
            / 4.0;
        for hf in mesh.tet_half_faces(t) {
            let [a, ..] = mesh.half_face_vertices(hf);
            let outward = mesh.position(a).coords - centroid;
            assert!(mesh.half_face_normal(hf).dot(&outward) > 0.0, "{:?}", hf);
        }
    }

    #[test]
    fn test_half_face_opposite_vertex() {
        let mesh = single_tet();
        let t = TetId::new(0);
        let vs = mesh.tet_vertices(t);
        for (i, hf) in mesh.tet_half_faces(t).into_iter().enumerate() {
            assert!(!mesh.half_face_vertices(hf).contains(&vs[i]));
            assert_eq!(mesh.half_face_tet(hf), t);
        }
    }

    #[test]
    fn test_duals_within_tet() {
        let mesh = single_tet();
        for (he, h) in mesh.half_edges() {
            let dual = mesh.half_edge_dual(he);
            assert_ne!(dual, he);
            assert_eq!(mesh.half_edge_dual(dual), he);
            assert_eq!(mesh.half_edge_source(dual), h.target);
            assert_eq!(mesh.half_edge_target(dual), h.source);
            assert_eq!(mesh.half_edge_tet(dual), mesh.half_edge_tet(he));
            assert_eq!(mesh.half_edge_edge(dual), h.edge);
        }
    }

    #[test]
    fn test_tet_pair_shares_face() {
        let mesh = tet_pair();
        assert_eq!(mesh.num_tets(), 2);
        assert_eq!(mesh.num_edges(), 9);
        assert_eq!(mesh.num_faces(), 7);
        assert_eq!(mesh.num_half_faces(), 8);

        let ids = [1, 2, 3].map(TetVertexId::new);
        let shared = mesh.find_face(ids).unwrap();
        assert!(!mesh.face(shared).boundary);
        let (a, b) = mesh.face_half_faces(shared);
        let b = b.unwrap();
        assert_eq!(mesh.half_face_twin(a), Some(b));
        assert_eq!(mesh.half_face_twin(b), Some(a));
        assert_ne!(mesh.half_face_tet(a), mesh.half_face_tet(b));
        assert_eq!(mesh.boundary_half_faces().count(), 6);

        // Every vertex of two glued tets is still on the hull
        assert_eq!(mesh.boundary_vertices().count(), 5);

        let e = mesh.vertex_edge_to(TetVertexId::new(2), TetVertexId::new(1)).unwrap();
        assert_eq!(mesh.edge_tets(e).len(), 2);
        assert_eq!(mesh.edge_half_edges(e).count(), 4);
        assert_eq!(mesh.vertex_tets(TetVertexId::new(1)).count(), 2);
        assert_eq!(mesh.vertex_edges(TetVertexId::new(0)).count(), 3);
    }

    #[test]
    fn test_inverted_tet_is_repaired() {
        let mut mesh = TetMesh::new();
        for p in unit_tet_positions() {
            mesh.add_vertex(p);
        }
        let t = mesh.construct_tet_with_orientation([1, 0, 2, 3]).unwrap();
        assert!(mesh.tet_volume(t) > 0.0);
        assert_eq!(mesh.tet_vertex_ids()[0], [0, 1, 2, 3]);
    }

    #[test]
    fn test_unchecked_tet_keeps_order() {
        let mut mesh = TetMesh::new();
        for p in unit_tet_positions() {
            mesh.add_vertex(p);
        }
        let t = mesh.construct_tet([1, 0, 2, 3]).unwrap();
        assert!(mesh.tet_volume(t) < 0.0);
    }

    #[test]
    fn test_repeated_vertex_rejected() {
        let mut mesh = TetMesh::new();
        for p in unit_tet_positions() {
            mesh.add_vertex(p);
        }
        let err = mesh.construct_tet([0, 1, 1, 3]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::DegenerateTet { reason: "repeated vertex", .. }
        ));
        assert_eq!(mesh.num_tets(), 0);
    }

    #[test]
    fn test_flat_tet_rejected() {
        let mut mesh = TetMesh::new();
        for i in 0..4 {
            mesh.add_vertex(Point3::new(i as f64, (i % 2) as f64, 0.0));
        }
        let err = mesh.construct_tet_with_orientation([0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateTet { reason: "zero volume", .. }));
        assert_eq!(mesh.num_half_faces(), 0);
    }

    #[test]
    fn test_unknown_vertex_rejected() {
        let mut mesh = TetMesh::new();
        mesh.add_vertex(Point3::origin());
        let err = mesh.construct_tet([0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidId { kind: "tet vertex", index: 1 }));
    }

    #[test]
    fn test_third_tet_on_face_rejected() {
        let mut mesh = tet_pair();
        mesh.add_vertex(Point3::new(0.5, 0.5, 0.5));
        let err = mesh.construct_tet([1, 2, 3, 5]).unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldFace { vertices: [1, 2, 3] }));
        assert_eq!(mesh.num_tets(), 2);
    }

    #[test]
    fn test_label_boundary_idempotent() {
        let mut mesh = tet_pair();
        let before: Vec<bool> = mesh.edges().map(|(_, e)| e.boundary).collect();
        mesh.label_boundary();
        let after: Vec<bool> = mesh.edges().map(|(_, e)| e.boundary).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_isolated_vertices() {
        let mut mesh = single_tet();
        assert!(mesh.check_isolated_vertices().is_ok());
        mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));
        assert_eq!(mesh.isolated_vertices(), vec![TetVertexId::new(4)]);
        assert!(matches!(
            mesh.check_isolated_vertices(),
            Err(MeshError::IsolatedVertex { vertex: 4 })
        ));
    }
}
