//! Surface mesh construction.
//!
//! Triangles are added one at a time. Edges are resolved through the vertex
//! incidence lists: a new half-edge `a -> b` pairs with an existing `b -> a`
//! if there is one, otherwise it opens a new boundary edge. Once every face is
//! in place, [`SurfaceMesh::label_boundary`] classifies the boundary and makes
//! the boundary vertex anchors canonical.

use nalgebra::Point3;

use super::halfedge::{Edge, Face, HalfEdge, SurfaceMesh};
use super::index::{EdgeId, FaceId, HalfEdgeId, HalfFaceId, VertexId};
use crate::error::{MeshError, Result};

/// Flatten a surface mesh into positions and triangle index lists.
///
/// Vertices are numbered densely in id order, skipping deleted slots, so the
/// result is ready for the face-vertex exporters.
pub fn to_face_vertex(mesh: &SurfaceMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut dense = vec![usize::MAX; mesh.vertex_pool().size()];
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for (v, vertex) in mesh.vertices() {
        dense[v.index()] = vertices.len();
        vertices.push(vertex.position);
    }

    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_triangle(f).map(|v| dense[v.index()]))
        .collect();

    (vertices, faces)
}

impl SurfaceMesh {
    /// Add a triangle over three existing vertices, in winding order.
    ///
    /// # Errors
    /// - `InvalidId` if a vertex does not exist
    /// - `DegenerateFace` if a vertex is repeated
    /// - `NonManifoldEdge` if a directed edge is already used by another face
    pub(crate) fn add_face(&mut self, vs: [VertexId; 3], source: HalfFaceId) -> Result<FaceId> {
        for &v in &vs {
            self.try_vertex(v)?;
        }
        if vs[0] == vs[1] || vs[1] == vs[2] || vs[0] == vs[2] {
            return Err(MeshError::DegenerateFace {
                face: self.faces.size(),
            });
        }
        // Reject before mutating so a failed face leaves the mesh untouched
        for i in 0..3 {
            let (a, b) = (vs[i], vs[(i + 1) % 3]);
            if self.vertex_half_edge_to(a, b).is_some() {
                return Err(MeshError::NonManifoldEdge {
                    v0: a.index(),
                    v1: b.index(),
                });
            }
        }

        let face = self.faces.create(Face {
            halfedge: HalfEdgeId::invalid(),
            boundary: false,
            source,
        });

        let hes: [HalfEdgeId; 3] = std::array::from_fn(|i| {
            self.half_edges.create(HalfEdge {
                source: vs[i],
                target: vs[(i + 1) % 3],
                next: HalfEdgeId::invalid(),
                prev: HalfEdgeId::invalid(),
                sym: None,
                edge: EdgeId::invalid(),
                face,
            })
        });

        for i in 0..3 {
            let he = hes[i];
            let (a, b) = (vs[i], vs[(i + 1) % 3]);
            {
                let h = &mut self.half_edges[he];
                h.next = hes[(i + 1) % 3];
                h.prev = hes[(i + 2) % 3];
            }

            let edge = match self.vertex_half_edge_to(b, a) {
                Some(opp) => {
                    let edge = self.edge_of(opp);
                    self.edges[edge].half_edges[1] = he;
                    self.half_edges[opp].sym = Some(he);
                    self.half_edges[he].sym = Some(opp);
                    edge
                }
                None => self.edges.create(Edge {
                    half_edges: [he, HalfEdgeId::invalid()],
                    boundary: false,
                }),
            };
            self.half_edges[he].edge = edge;

            let vertex = &mut self.vertices[a];
            vertex.out_half_edges.push(he);
            if !vertex.halfedge.is_valid() {
                vertex.halfedge = he;
            }
        }

        self.faces[face].halfedge = hes[0];
        Ok(face)
    }

    /// Classify boundary edges, faces and vertices, and canonicalize anchors.
    ///
    /// Every edge with a single half-edge is marked boundary along with both
    /// endpoints and its face. Each boundary vertex then stores its most
    /// clockwise outgoing half-edge as anchor. Running this twice gives the
    /// same result.
    ///
    /// # Errors
    /// - `IsolatedVertex` if a live vertex has no outgoing half-edge
    /// - `NonManifoldVertex` if the faces around a vertex do not form a
    ///   single fan
    pub fn label_boundary(&mut self) -> Result<()> {
        for (_, v) in self.vertices.iter_mut() {
            v.boundary = false;
        }
        for (_, f) in self.faces.iter_mut() {
            f.boundary = false;
        }

        let mut boundary_edges = Vec::new();
        for (eid, e) in self.edges.iter_mut() {
            e.boundary = !e.half_edges[1].is_valid();
            if e.boundary {
                boundary_edges.push(eid);
            }
        }

        for &e in &boundary_edges {
            let he = self.edges[e].half_edges[0];
            let HalfEdge {
                source,
                target,
                face,
                ..
            } = self.half_edges[he];
            self.vertices[source].boundary = true;
            self.vertices[target].boundary = true;
            self.faces[face].boundary = true;
        }

        if let Some((vid, _)) = self.vertices.iter().find(|(_, v)| !v.halfedge.is_valid()) {
            return Err(MeshError::IsolatedVertex {
                vertex: vid.index(),
            });
        }

        let boundary_vertices: Vec<VertexId> = self
            .vertices
            .iter()
            .filter(|(_, v)| v.boundary)
            .map(|(id, _)| id)
            .collect();
        for &v in &boundary_vertices {
            let anchor = self.find_most_clw_out(v);
            self.vertices[v].halfedge = anchor;
        }

        if let Some(v) = self.vertices.ids().find(|&v| !self.is_single_fan(v)) {
            return Err(MeshError::NonManifoldVertex { vertex: v.index() });
        }

        log::debug!(
            "labeled surface boundary: {} edges, {} vertices",
            boundary_edges.len(),
            boundary_vertices.len()
        );
        Ok(())
    }

    /// Whether a counter-clockwise sweep from the anchor reaches every
    /// outgoing half-edge of `v`.
    pub(crate) fn is_single_fan(&self, v: VertexId) -> bool {
        let vertex = self.vertex(v);
        let total = vertex.out_half_edges.len();
        let start = vertex.halfedge;
        let mut he = start;
        let mut count = 1;
        while let Some(n) = self.vertex_next_ccw_out(he) {
            if n == start || count > total {
                break;
            }
            count += 1;
            he = n;
        }
        count == total
    }

    /// Rotate clockwise from the anchor until the rotation is undefined.
    fn find_most_clw_out(&self, v: VertexId) -> HalfEdgeId {
        let start = self.vertex_half_edge(v);
        let mut he = start;
        while let Some(n) = self.vertex_next_clw_out(he) {
            if n == start {
                break;
            }
            he = n;
        }
        he
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a labeled mesh from positions and triangles.
    pub(crate) fn mesh_from(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> SurfaceMesh {
        let mut mesh = SurfaceMesh::with_capacity(vertices.len(), faces.len());
        let ids: Vec<VertexId> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();
        for f in faces {
            mesh.add_face([ids[f[0]], ids[f[1]], ids[f[2]]], HalfFaceId::invalid())
                .unwrap();
        }
        mesh.label_boundary().unwrap();
        mesh
    }

    /// A hexagonal fan: one interior vertex (0) and six boundary vertices.
    pub(crate) fn hexagon_fan() -> SurfaceMesh {
        let mut vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        for i in 0..6 {
            let a = i as f64 * std::f64::consts::PI / 3.0;
            vertices.push(Point3::new(a.cos(), a.sin(), 0.0));
        }
        let faces: Vec<[usize; 3]> = (0..6).map(|i| [0, 1 + i, 1 + (i + 1) % 6]).collect();
        mesh_from(&vertices, &faces)
    }

    /// A strip of two triangles sharing edge 0-1.
    pub(crate) fn two_triangles() -> SurfaceMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        mesh_from(&vertices, &[[0, 1, 2], [1, 0, 3]])
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = mesh_from(&vertices, &[[0, 1, 2]]);

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_half_edges(), 3);

        for (vid, v) in mesh.vertex_pool() {
            assert!(v.boundary);
            assert!(mesh.is_boundary_vertex(vid));
        }
    }

    #[test]
    fn test_two_triangles_share_edge() {
        let mesh = two_triangles();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_half_edges(), 6);

        let he = mesh.vertex_half_edge_to(VertexId::new(0), VertexId::new(1)).unwrap();
        let sym = mesh.sym(he).unwrap();
        assert_eq!(mesh.source(sym), VertexId::new(1));
        assert_eq!(mesh.edge_of(he), mesh.edge_of(sym));
        assert!(!mesh.is_boundary_edge(mesh.edge_of(he)));
    }

    #[test]
    fn test_boundary_anchor_is_most_clockwise() {
        let mesh = hexagon_fan();
        for (vid, v) in mesh.vertex_pool() {
            if v.boundary {
                // The anchor has no sym, so it cannot rotate further clockwise
                assert!(mesh.sym(v.halfedge).is_none(), "{:?}", vid);
            }
        }
        assert!(!mesh.vertex(VertexId::new(0)).boundary);
    }

    #[test]
    fn test_label_boundary_idempotent() {
        let mut mesh = hexagon_fan();
        let before: Vec<_> = mesh
            .vertex_pool()
            .iter()
            .map(|(_, v)| (v.boundary, v.halfedge))
            .collect();
        mesh.label_boundary().unwrap();
        let after: Vec<_> = mesh
            .vertex_pool()
            .iter()
            .map(|(_, v)| (v.boundary, v.halfedge))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_isolated_vertex_is_error() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        mesh.add_face([a, b, c], HalfFaceId::invalid()).unwrap();

        let err = mesh.label_boundary().unwrap_err();
        assert!(matches!(err, MeshError::IsolatedVertex { vertex: 3 }));
    }

    #[test]
    fn test_bowtie_vertex_rejected() {
        let mut mesh = SurfaceMesh::new();
        let ids: Vec<_> = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]]
            .iter()
            .map(|&[x, y]| mesh.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        // Two triangles touching only at vertex 0
        mesh.add_face([ids[0], ids[1], ids[2]], HalfFaceId::invalid()).unwrap();
        mesh.add_face([ids[0], ids[3], ids[4]], HalfFaceId::invalid()).unwrap();

        let err = mesh.label_boundary().unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldVertex { vertex: 0 }), "{}", err);
        assert!(mesh.is_single_fan(ids[1]));
    }

    #[test]
    fn test_degenerate_face() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let result = mesh.add_face([a, a, b], HalfFaceId::invalid());
        assert!(matches!(result, Err(MeshError::DegenerateFace { .. })));
        assert_eq!(mesh.num_faces(), 0);
    }

    #[test]
    fn test_same_direction_edge_rejected() {
        let mut mesh = SurfaceMesh::new();
        let ids: Vec<_> = (0..4)
            .map(|i| mesh.add_vertex(Point3::new(i as f64, (i % 2) as f64, 0.0)))
            .collect();
        mesh.add_face([ids[0], ids[1], ids[2]], HalfFaceId::invalid()).unwrap();
        let result = mesh.add_face([ids[0], ids[1], ids[3]], HalfFaceId::invalid());
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })));
        // Nothing was half-built
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_half_edges(), 3);
    }

    #[test]
    fn test_to_face_vertex() {
        let mesh = two_triangles();
        let (vertices, faces) = to_face_vertex(&mesh);
        assert_eq!(vertices.len(), 4);
        assert_eq!(faces, vec![[0, 1, 2], [1, 0, 3]]);
        assert_eq!(vertices[3], Point3::new(0.5, -1.0, 0.0));
    }

    #[test]
    fn test_invalid_vertex() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let result = mesh.add_face([a, VertexId::new(7), VertexId::new(8)], HalfFaceId::invalid());
        assert!(matches!(result, Err(MeshError::InvalidId { kind: "vertex", index: 7 })));
    }
}
