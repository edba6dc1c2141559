//! Error types for tetkit.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, loading or querying meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// An element id is out of range or refers to a deleted slot.
    #[error("invalid {kind} id {index}")]
    InvalidId {
        /// The element kind ("vertex", "half-edge", ...).
        kind: &'static str,
        /// The raw slot index.
        index: usize,
    },

    /// A vertex has no incident half-edge after construction.
    #[error("vertex {vertex} is isolated (no incident half-edge)")]
    IsolatedVertex {
        /// The dense vertex index.
        vertex: usize,
    },

    /// A tetrahedron has repeated vertices or no volume.
    #[error("degenerate tetrahedron {vertices:?}: {reason}")]
    DegenerateTet {
        /// The vertex indices as given.
        vertices: [usize; 4],
        /// Why the tet was rejected.
        reason: &'static str,
    },

    /// A line of a mesh file could not be interpreted.
    #[error("malformed mesh file at line {line}: {message}")]
    MalformedFile {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// An explicit edge record has no matching edge derived from the tets.
    #[error("edge ({v0}, {v1}) declared at line {line} does not exist in the tet mesh")]
    MissingEdge {
        /// 1-based line number.
        line: usize,
        /// First file vertex id.
        v0: i64,
        /// Second file vertex id.
        v1: i64,
    },

    /// A triangle has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index in construction order.
        face: usize,
    },

    /// An edge has more than two incident triangles, or two with the same direction.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The faces around a vertex form more than one fan.
    #[error("vertex {vertex} joins several separate fans of faces")]
    NonManifoldVertex {
        /// The surface vertex index.
        vertex: usize,
    },

    /// A triangle is shared by more than two tetrahedra.
    #[error("face {vertices:?} is shared by more than two tetrahedra")]
    NonManifoldFace {
        /// The sorted vertex triple.
        vertices: [usize; 3],
    },

    /// A connectivity invariant does not hold.
    #[error("invalid topology: {details}")]
    InvalidTopology {
        /// Description of the violated invariant.
        details: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),
}

impl MeshError {
    /// Create a malformed-file error for a 1-based line number.
    pub fn malformed<S: Into<String>>(line: usize, message: S) -> Self {
        MeshError::MalformedFile {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid-topology error.
    pub fn topology<S: Into<String>>(details: S) -> Self {
        MeshError::InvalidTopology {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = MeshError::malformed(12, "expected Vertex, found Tet");
        assert_eq!(
            err.to_string(),
            "malformed mesh file at line 12: expected Vertex, found Tet"
        );

        let err = MeshError::InvalidId { kind: "vertex", index: 7 };
        assert_eq!(err.to_string(), "invalid vertex id 7");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MeshError = io.into();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
