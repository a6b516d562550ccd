//! Error types for location resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while classifying and normalizing locations.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The input string is neither an existing path nor a supported URI.
    ///
    /// Syntactically valid but non-existent paths land here as well; they
    /// are indistinguishable from garbage input by design.
    #[error("unsupported location `{location}`: not an existing path or a supported URI (possibly a nonexistent path)")]
    Unsupported {
        /// The offending input string.
        location: String,
    },

    /// An existing path could not be canonicalized into an absolute form.
    #[error("cannot canonicalize path {path}: {source}")]
    Canonicalize {
        /// The path that failed to canonicalize.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An absolute path could not be expressed as a `file://` URI.
    #[error("cannot express path as file URI: {path}")]
    FileUri {
        /// The path that could not be converted.
        path: PathBuf,
    },
}

impl LocateError {
    /// Creates an unsupported-location error.
    pub fn unsupported(location: impl Into<String>) -> Self {
        Self::Unsupported {
            location: location.into(),
        }
    }

    /// Creates a canonicalization error.
    pub fn canonicalize(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Canonicalize {
            path: path.into(),
            source,
        }
    }

    /// Creates a file-URI conversion error.
    pub fn file_uri(path: impl Into<PathBuf>) -> Self {
        Self::FileUri { path: path.into() }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<std::io::Error>` because the
// variants require path context the source error doesn't carry. The helper
// constructors are the pattern used throughout this crate.
