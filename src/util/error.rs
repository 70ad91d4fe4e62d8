//! Error types for the exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for document parsing and export operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Document, directory or side-car buffer does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An attribute the export path requires is absent from a record
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// Record or array has a shape the exporter cannot use
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Element type name not present in the type table
    #[error("Unsupported element type: {0}")]
    UnsupportedType(String),

    /// Document is not valid JSON
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a missing attribute error for a dotted attribute path.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingAttribute(path.into())
    }

    /// Map an I/O error on `path` to [`Error::FileNotFound`] when the file is absent.
    pub fn from_io_at(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path.into())
        } else {
            Self::Io(err)
        }
    }
}

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::missing("mesh.points");
        assert!(e.to_string().contains("mesh.points"));

        let e = Error::FileNotFound(PathBuf::from("root-json/a.raw"));
        assert!(e.to_string().contains("a.raw"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from_io_at(io_err, "x.raw");
        assert!(matches!(err, Error::FileNotFound(p) if p == PathBuf::from("x.raw")));
    }
}
