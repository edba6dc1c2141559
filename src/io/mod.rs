//! Mesh file I/O.
//!
//! Tet meshes are read from and written to the `.t` text format; extracted
//! surface meshes are exported to common triangle formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Tet mesh | `.t` | ✓ | ✓ | Volumetric input |
//! | Wavefront OBJ | `.obj` | ✗ | ✓ | Surface export |
//! | STL | `.stl` | ✗ | ✓ | Binary surface export |
//! | PLY | `.ply` | ✗ | ✓ | ASCII, with tet vertex back-references |
//!
//! # Usage
//!
//! ```no_run
//! use tetkit::io::{load_tet, save};
//! use tetkit::mesh::SurfaceMesh;
//!
//! let tets = load_tet("model.t").unwrap();
//! let surface = SurfaceMesh::from_tet_mesh(&tets).unwrap();
//!
//! // Format chosen by extension
//! save(&surface, "boundary.stl").unwrap();
//! ```
//!
//! Format-specific functions accept options or any writer:
//!
//! ```no_run
//! use tetkit::io::tet::{self, LoadOptions};
//!
//! let options = LoadOptions::default().with_allow_isolated_vertices(true);
//! let tets = tet::load("model.t", &options).unwrap();
//! tet::save(&tets, "copy.t").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;
pub mod tet;
pub mod tokenizer;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::SurfaceMesh;
use crate::tet::TetMesh;

pub use tet::LoadOptions;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.t` tet mesh format.
    Tet,
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "t" => Some(Format::Tet),
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a `.t` tet mesh with default [`LoadOptions`].
pub fn load_tet<P: AsRef<Path>>(path: P) -> Result<TetMesh> {
    tet::load(path, &LoadOptions::default())
}

/// Save a surface mesh, choosing the format by file extension.
///
/// # Errors
/// `UnsupportedFormat` for unknown extensions, `SaveError` for `.t` (a
/// surface has no tets).
pub fn save<P: AsRef<Path>>(mesh: &SurfaceMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
        Format::Tet => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "surface meshes cannot be written as .t".to_string(),
        }),
    }
}
