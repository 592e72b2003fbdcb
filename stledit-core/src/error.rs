//! Error types for STL parsing, writing and mesh geometry.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for STL and mesh operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors raised while reading, writing or measuring a mesh.
#[derive(Debug, Error)]
pub enum StlError {
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Malformed ASCII STL content.
    #[error("malformed STL at line {line}: {message}")]
    Format {
        /// 1-based line number of the offending line.
        line: usize,
        /// Description of what was wrong.
        message: String,
    },

    /// Centroid or volume requested where no finite, non-zero weight exists.
    #[error("centroid and volume are undefined for this mesh ({triangles} triangles, zero total volume)")]
    DegenerateMesh {
        /// Number of triangles in the mesh.
        triangles: usize,
    },

    /// Solid name that would not survive a write and re-read.
    #[error("invalid solid name {name:?}: must be one non-empty token without whitespace")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// `save` was called on a mesh that was never loaded from a file.
    #[error("mesh has no source path to save to")]
    NoSourcePath,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StlError {
    /// Create a `Format` error for the given line.
    #[must_use]
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_display_includes_line() {
        let err = StlError::format(7, "facet has 2 vertices, expected 3");
        assert_eq!(
            err.to_string(),
            "malformed STL at line 7: facet has 2 vertices, expected 3"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StlError = io.into();
        assert!(matches!(err, StlError::Io(_)));
    }
}
