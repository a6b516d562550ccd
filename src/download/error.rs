//! Error types for the download module.
//!
//! Structured errors for all download operations, providing context-rich
//! messages for debugging and caller feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during file downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The configured download directory does not exist.
    ///
    /// Always fatal and never silenced: directory creation is the caller's
    /// responsibility, so a missing directory is a configuration error.
    #[error("download directory does not exist: {path}")]
    MissingDirectory {
        /// The missing directory path.
        path: PathBuf,
    },

    /// The provided URL is malformed or uses a non-downloadable scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, rename, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a missing-directory configuration error.
    pub fn missing_directory(path: impl Into<PathBuf>) -> Self {
        Self::MissingDirectory { path: path.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for transport/HTTP failures that `ignore_errors` may silence.
    ///
    /// A malformed URL counts as a per-item fetch failure here, so one bad
    /// entry cannot abort an otherwise silenced batch. Configuration and
    /// filesystem errors always propagate.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. }
                | Self::Network { .. }
                | Self::Timeout { .. }
                | Self::HttpStatus { .. }
        )
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because the variants require context (url, path)
// that the source errors don't provide. The helper constructors are the
// correct pattern here.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_display() {
        let error = DownloadError::missing_directory("/data/corpus");
        let msg = error.to_string();
        assert!(msg.contains("does not exist"), "Expected hint in: {msg}");
        assert!(msg.contains("/data/corpus"), "Expected path in: {msg}");
    }

    #[test]
    fn test_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/file.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_timeout_display() {
        let error = DownloadError::timeout("https://example.com/file.pdf");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/file.pdf"));
    }

    #[test]
    fn test_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.pdf"), io_error);
        assert!(error.to_string().contains("/tmp/test.pdf"));
    }

    #[test]
    fn test_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_ignorable_classification() {
        assert!(DownloadError::http_status("u", 404).is_ignorable());
        assert!(DownloadError::timeout("u").is_ignorable());
        assert!(DownloadError::invalid_url("u").is_ignorable());
        assert!(!DownloadError::missing_directory("/d").is_ignorable());
        let io_error = std::io::Error::other("disk full");
        assert!(!DownloadError::io("/d/f", io_error).is_ignorable());
    }
}
