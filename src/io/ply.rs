//! PLY (Stanford polygon) export.
//!
//! Writes ASCII PLY. Each vertex also carries the id of the tet vertex it was
//! extracted from, so the surface can be mapped back onto the volume.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::mesh::{to_face_vertex, SurfaceMesh};

/// Write a surface mesh as ASCII PLY.
pub fn write<W: Write>(mesh: &SurfaceMesh, mut writer: W) -> Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);

    // Header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by tetkit")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "property int source")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    // to_face_vertex numbers vertices in id order
    for (p, (_, vertex)) in vertices.iter().zip(mesh.vertices()) {
        let source = if vertex.source.is_valid() {
            vertex.source.index() as i64
        } else {
            -1
        };
        writeln!(writer, "{} {} {} {}", p.x, p.y, p.z, source)?;
    }
    for f in &faces {
        writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
    }
    Ok(())
}

/// Save a surface mesh to an ASCII PLY file.
pub fn save<P: AsRef<Path>>(mesh: &SurfaceMesh, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}
