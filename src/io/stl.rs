//! STL export.
//!
//! Writes binary STL through `stl_io`. Normals are the per-face normals of
//! the surface winding, so outward for an extracted boundary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::SurfaceMesh;

fn stl_vertex(p: &Point3<f64>) -> stl_io::Vertex {
    stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])
}

fn triangles(mesh: &SurfaceMesh) -> Vec<stl_io::Triangle> {
    mesh.face_ids()
        .map(|f| {
            let [p0, p1, p2] = mesh.face_positions(f);
            let n = mesh.face_normal(f);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [stl_vertex(&p0), stl_vertex(&p1), stl_vertex(&p2)],
            }
        })
        .collect()
}

/// Write a surface mesh as binary STL.
pub fn write<W: Write>(mesh: &SurfaceMesh, mut writer: W) -> std::io::Result<()> {
    let triangles = triangles(mesh);
    stl_io::write_stl(&mut writer, triangles.iter())
}

/// Save a surface mesh to a binary STL file.
///
/// # Example
///
/// ```no_run
/// use tetkit::io::{load_tet, stl};
/// use tetkit::mesh::SurfaceMesh;
///
/// let surface = SurfaceMesh::from_tet_mesh(&load_tet("model.t").unwrap()).unwrap();
/// stl::save(&surface, "boundary.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &SurfaceMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write(mesh, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| MeshError::SaveError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
