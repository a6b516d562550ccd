//! Location classification and URI normalization.
//!
//! A *location* is any caller-supplied string denoting a file: an existing
//! local path or a URI with a file-capable scheme. This module turns a
//! batch of heterogeneous locations into validated, canonical URIs,
//! partitioning the inputs that cannot be resolved.
//!
//! # Example
//!
//! ```no_run
//! use docfetch::locate;
//!
//! # fn example() -> Result<(), docfetch::LocateError> {
//! let inputs = vec![
//!     "https://example.com/paper.pdf".to_string(),
//!     "./notes/outline.md".to_string(),
//! ];
//! let uris = locate::resolve(&inputs, true)?;
//! for uri in uris.into_iter().flatten() {
//!     println!("{uri}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

pub use error::LocateError;

/// URI schemes accepted as file-capable sources.
pub const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "file"];

/// Classification of a caller-supplied location string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// An existing local filesystem entry (file or directory).
    Path,
    /// A URI with a supported scheme (http, https, ftp, file).
    Uri,
    /// Neither of the above, including valid-looking but nonexistent paths.
    Unsupported,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Uri => write!(f, "URI"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Classifies a location string.
///
/// URIs are recognized first: anything that parses with a scheme in
/// [`SUPPORTED_SCHEMES`] is a [`LocationKind::Uri`]. Otherwise the string
/// is checked against the filesystem; only entries that exist at
/// classification time count as [`LocationKind::Path`]. Everything else is
/// [`LocationKind::Unsupported`] - a nonexistent path cannot be told apart
/// from garbage input.
///
/// # Examples
///
/// ```
/// use docfetch::locate::{LocationKind, classify};
///
/// assert_eq!(classify("https://example.com/doc.pdf"), LocationKind::Uri);
/// assert_eq!(classify("no/such/path.txt"), LocationKind::Unsupported);
/// ```
#[must_use]
pub fn classify(s: &str) -> LocationKind {
    if let Ok(parsed) = Url::parse(s)
        && SUPPORTED_SCHEMES.contains(&parsed.scheme())
    {
        return LocationKind::Uri;
    }
    if Path::new(s).exists() {
        return LocationKind::Path;
    }
    LocationKind::Unsupported
}

/// Converts an existing local path into an absolute, canonical `file://` URI.
///
/// # Errors
///
/// Returns [`LocateError::Canonicalize`] if the path cannot be
/// canonicalized (e.g. it was removed between classification and
/// conversion), or [`LocateError::FileUri`] if the canonical path cannot
/// be expressed as a URI.
pub fn file_uri(path: &Path) -> Result<String, LocateError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| LocateError::canonicalize(path, e))?;
    Url::from_file_path(&canonical)
        .map(|u| u.to_string())
        .map_err(|()| LocateError::file_uri(canonical))
}

/// Resolves a batch of locations into canonical URIs, preserving order.
///
/// Each entry becomes:
/// - the input string unchanged, when it is already a supported URI;
/// - an absolute canonical `file://` URI, when it is an existing path;
/// - `None`, when it is unsupported and `silent` is true (callers filter).
///
/// An empty input yields an empty result.
///
/// # Errors
///
/// With `silent` set to false, the first unsupported location fails the
/// whole batch with [`LocateError::Unsupported`] naming the offending
/// string. Path-to-URI conversion failures propagate regardless of
/// `silent` - they indicate a filesystem race, not bad input.
pub fn resolve(locations: &[String], silent: bool) -> Result<Vec<Option<String>>, LocateError> {
    locations
        .iter()
        .map(|location| resolve_one(location, silent))
        .collect()
}

/// Resolves a batch of locations into `(uri, file_type)` pairs.
///
/// The file type is the last-dot suffix of the URI's path component,
/// without the leading dot (`Some("pdf")` for `report.pdf`), or `None`
/// when the path has no suffix. Unresolvable entries yield `(None, None)`
/// in silent mode.
///
/// # Errors
///
/// Same contract as [`resolve`].
#[allow(clippy::type_complexity)]
pub fn resolve_with_types(
    locations: &[String],
    silent: bool,
) -> Result<Vec<(Option<String>, Option<String>)>, LocateError> {
    locations
        .iter()
        .map(|location| {
            let uri = resolve_one(location, silent)?;
            let file_type = uri.as_deref().and_then(uri_suffix);
            Ok((uri, file_type))
        })
        .collect()
}

fn resolve_one(location: &str, silent: bool) -> Result<Option<String>, LocateError> {
    match classify(location) {
        LocationKind::Uri => Ok(Some(location.to_string())),
        LocationKind::Path => {
            let uri = file_uri(Path::new(location))?;
            debug!(location, uri = %uri, "resolved path to file URI");
            Ok(Some(uri))
        }
        LocationKind::Unsupported => {
            if silent {
                debug!(location, "skipping unsupported location");
                Ok(None)
            } else {
                Err(LocateError::unsupported(location))
            }
        }
    }
}

/// Extracts the dot-suffix of a URI's last path segment, without the dot.
fn uri_suffix(uri: &str) -> Option<String> {
    let parsed = Url::parse(uri).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let dot = last.rfind('.')?;
    let suffix = &last[dot + 1..];
    (!suffix.is_empty() && dot > 0).then(|| suffix.to_string())
}

/// Iterator over every file under a folder, recursing into subfolders.
///
/// Directories themselves are not yielded. Unreadable directories are
/// logged and skipped rather than aborting the traversal.
#[derive(Debug)]
pub struct PathTraversal {
    stack: Vec<PathBuf>,
}

impl Iterator for PathTraversal {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        while let Some(path) = self.stack.pop() {
            if path.is_dir() {
                match fs::read_dir(&path) {
                    Ok(entries) => {
                        for entry in entries.flatten() {
                            self.stack.push(entry.path());
                        }
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable directory");
                    }
                }
            } else {
                return Some(path);
            }
        }
        None
    }
}

/// Traverses all files inside the given folder, recursively.
pub fn traverse_paths(folder: impl Into<PathBuf>) -> PathTraversal {
    PathTraversal {
        stack: vec![folder.into()],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_supported_schemes_as_uri() {
        assert_eq!(classify("http://example.com/a.pdf"), LocationKind::Uri);
        assert_eq!(classify("https://example.com/a.pdf"), LocationKind::Uri);
        assert_eq!(classify("ftp://mirror.example.org/pub/a.gz"), LocationKind::Uri);
        assert_eq!(classify("file:///tmp/a.txt"), LocationKind::Uri);
    }

    #[test]
    fn test_classify_scheme_check_is_case_insensitive() {
        // Url::parse lowercases the scheme during parsing
        assert_eq!(classify("HTTPS://example.com/a.pdf"), LocationKind::Uri);
    }

    #[test]
    fn test_classify_unsupported_scheme_falls_through() {
        assert_eq!(classify("mailto:someone@example.com"), LocationKind::Unsupported);
        assert_eq!(classify("ssh://host/file"), LocationKind::Unsupported);
    }

    #[test]
    fn test_classify_nonexistent_path_is_unsupported() {
        assert_eq!(
            classify("/definitely/not/a/real/path.txt"),
            LocationKind::Unsupported
        );
    }

    #[test]
    fn test_classify_existing_directory_is_path() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            classify(dir.path().to_str().unwrap()),
            LocationKind::Path
        );
    }

    #[test]
    fn test_location_kind_display() {
        assert_eq!(LocationKind::Path.to_string(), "path");
        assert_eq!(LocationKind::Uri.to_string(), "URI");
        assert_eq!(LocationKind::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_uri_suffix_extraction() {
        assert_eq!(
            uri_suffix("https://example.com/docs/report.pdf"),
            Some("pdf".to_string())
        );
        assert_eq!(uri_suffix("https://example.com/docs/report"), None);
        // Trailing dot is not a suffix
        assert_eq!(uri_suffix("https://example.com/docs/report."), None);
        // Dotfile-style segment has no suffix
        assert_eq!(uri_suffix("https://example.com/docs/.hidden"), None);
    }

    #[test]
    fn test_resolve_empty_input_yields_empty_output() {
        let resolved = resolve(&[], false).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_silent_emits_placeholder_in_position() {
        let inputs = vec![
            "https://example.com/a.pdf".to_string(),
            "/no/such/path".to_string(),
            "https://example.com/b.pdf".to_string(),
        ];
        let resolved = resolve(&inputs, true).unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].as_deref(), Some("https://example.com/a.pdf"));
        assert!(resolved[1].is_none());
        assert_eq!(resolved[2].as_deref(), Some("https://example.com/b.pdf"));
    }

    #[test]
    fn test_resolve_strict_fails_on_unsupported() {
        let inputs = vec!["/no/such/path".to_string()];
        let result = resolve(&inputs, false);
        match result {
            Err(LocateError::Unsupported { location }) => {
                assert_eq!(location, "/no/such/path");
            }
            other => panic!("expected Unsupported error, got: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_uri_passes_through_unchanged() {
        // No normalization: the caller's string comes back verbatim
        let inputs = vec!["https://example.com/a%20b.pdf?x=1".to_string()];
        let resolved = resolve(&inputs, false).unwrap();
        assert_eq!(resolved[0].as_deref(), Some("https://example.com/a%20b.pdf?x=1"));
    }

    #[test]
    fn test_resolve_path_to_canonical_file_uri() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("doc.txt");
        std::fs::write(&file, b"hello").unwrap();

        let inputs = vec![file.to_str().unwrap().to_string()];
        let resolved = resolve(&inputs, false).unwrap();
        let uri = resolved[0].as_deref().unwrap();
        assert!(uri.starts_with("file://"), "expected file URI, got: {uri}");
        assert!(uri.ends_with("doc.txt"), "expected filename in URI: {uri}");
    }

    #[test]
    fn test_resolve_with_types_pairs_uri_and_suffix() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("paper.pdf");
        std::fs::write(&file, b"x").unwrap();

        let inputs = vec![
            file.to_str().unwrap().to_string(),
            "https://example.com/raw-data".to_string(),
            "/no/such/path".to_string(),
        ];
        let resolved = resolve_with_types(&inputs, true).unwrap();
        assert_eq!(resolved[0].1.as_deref(), Some("pdf"));
        assert!(resolved[0].0.as_deref().unwrap().starts_with("file://"));
        assert_eq!(resolved[1], (Some("https://example.com/raw-data".to_string()), None));
        assert_eq!(resolved[2], (None, None));
    }

    #[test]
    fn test_traverse_paths_yields_nested_files_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let sub = dir.path().join("sub").join("subsub");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), b"b").unwrap();
        std::fs::write(sub.join("c.txt"), b"c").unwrap();

        let mut names: Vec<String> = traverse_paths(dir.path())
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_traverse_paths_empty_folder() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(traverse_paths(dir.path()).count(), 0);
    }
}
