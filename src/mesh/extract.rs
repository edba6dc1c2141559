//! Boundary surface extraction.
//!
//! Every tet half-face without a twin becomes one surface triangle, wound the
//! same way (outwards). Surface vertices are the boundary tet vertices,
//! renumbered densely in tet vertex order. Each surface element keeps a
//! back-reference to the tet element it came from.

use super::halfedge::SurfaceMesh;
use super::index::VertexId;
use crate::error::{MeshError, Result};
use crate::tet::TetMesh;

impl SurfaceMesh {
    /// Extract the boundary surface of a tet mesh.
    ///
    /// The tet mesh must have been labeled with
    /// [`TetMesh::label_boundary`].
    ///
    /// # Example
    ///
    /// ```
    /// use tetkit::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let mut tets = TetMesh::new();
    /// for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
    ///     tets.add_vertex(Point3::from(p));
    /// }
    /// tets.construct_tet_with_orientation([0, 1, 2, 3]).unwrap();
    /// tets.label_boundary();
    ///
    /// let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();
    /// assert_eq!(surface.num_faces(), 4);
    /// assert_eq!(surface.num_edges(), 6);
    /// ```
    pub fn from_tet_mesh(tet: &TetMesh) -> Result<Self> {
        let mut mesh = Self::new();
        mesh.populate_from(tet)?;
        Ok(mesh)
    }

    /// Fill an empty surface mesh with the boundary of `tet`.
    ///
    /// # Errors
    /// - `InvalidState` if this mesh already has elements
    /// - `NonManifoldEdge` or `NonManifoldVertex` if the tet boundary is not
    ///   a manifold surface
    pub fn populate_from(&mut self, tet: &TetMesh) -> Result<()> {
        if !self.is_empty() {
            return Err(MeshError::InvalidState(
                "surface mesh must be empty before extraction".to_string(),
            ));
        }

        let boundary_faces: Vec<_> = tet.boundary_half_faces().collect();
        let boundary_vertices: Vec<_> = tet.boundary_vertices().collect();
        self.vertices.reserve(boundary_vertices.len());
        self.faces.reserve(boundary_faces.len());
        self.half_edges.reserve(boundary_faces.len() * 3);

        // Tet vertex slot -> surface vertex
        let mut renumber = vec![VertexId::invalid(); tet.vertex_pool().size()];
        for &tv in &boundary_vertices {
            let v = self.add_vertex(*tet.position(tv));
            self.vertices[v].source = tv;
            renumber[tv.index()] = v;
        }

        for &hf in &boundary_faces {
            let mut vs = [VertexId::invalid(); 3];
            for (slot, tv) in vs.iter_mut().zip(tet.half_face_vertices(hf)) {
                *slot = renumber[tv.index()];
                if !slot.is_valid() {
                    return Err(MeshError::topology(format!(
                        "boundary half-face {:?} uses unlabeled vertex {:?}",
                        hf, tv
                    )));
                }
            }
            self.add_face(vs, hf)?;
        }

        self.label_boundary()?;

        log::info!(
            "extracted surface: {} vertices, {} faces from {} tets",
            self.num_vertices(),
            self.num_faces(),
            tet.num_tets()
        );
        Ok(())
    }
}
