//! Extension knowledge base and file type inference.
//!
//! Downloads frequently arrive without a usable extension: the URL ends in
//! an opaque identifier, or in a trailing dot-token that only looks like an
//! extension. This module decides which trailing tokens are genuine
//! extensions, maps declared content types to extensions, and sniffs saved
//! bytes when headers give nothing away.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

/// Registry of recognized file extensions.
///
/// Backed by the system MIME registry (via `mime_guess`) plus a fixed set
/// of office-document extras the registry misses on some platforms.
/// Immutable after construction; pass it by reference into the download
/// engine. Tests can substitute a fixed set via [`from_extensions`].
///
/// [`from_extensions`]: ExtensionRegistry::from_extensions
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    /// System MIME registry plus fixed extras.
    System { extras: BTreeSet<String> },
    /// Fixed extension set, sole source of truth (for tests).
    Fixed(BTreeSet<String>),
}

/// Office-document extensions recognized regardless of the MIME registry.
const OFFICE_EXTRAS: [&str; 3] = ["docx", "pptx", "xlsx"];

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::system()
    }
}

impl ExtensionRegistry {
    /// Creates the process-standard registry: system MIME registry plus
    /// office-document extras.
    #[must_use]
    pub fn system() -> Self {
        Self {
            source: Source::System {
                extras: OFFICE_EXTRAS.iter().map(|s| (*s).to_string()).collect(),
            },
        }
    }

    /// Creates a registry recognizing exactly the given extensions.
    ///
    /// Leading dots are stripped and entries lowercased, so `".PDF"` and
    /// `"pdf"` are equivalent.
    #[must_use]
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = extensions
            .into_iter()
            .map(|ext| normalize_extension(&ext.into()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            source: Source::Fixed(set),
        }
    }

    /// Whether a trailing dot-token is a genuine extension.
    ///
    /// Accepts the token with or without its leading dot.
    #[must_use]
    pub fn is_known(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return false;
        }
        match &self.source {
            Source::Fixed(set) => set.contains(&ext),
            Source::System { extras } => {
                extras.contains(&ext) || mime_guess::from_ext(&ext).first().is_some()
            }
        }
    }

    /// Maps a declared content type to a file extension with leading dot.
    ///
    /// Parameters (`; charset=...`) are stripped. `application/octet-stream`
    /// maps to `None` - it carries no type information. Common document
    /// types resolve through a fixed table; everything else falls back to a
    /// reverse MIME registry lookup.
    #[must_use]
    pub fn extension_for_mime(&self, content_type: &str) -> Option<String> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if mime.is_empty() || mime == "application/octet-stream" {
            return None;
        }
        if let Some(ext) = well_known_extension(&mime) {
            return Some(ext.to_string());
        }
        mime_guess::get_mime_extensions_str(&mime)
            .and_then(|exts| exts.first())
            .map(|ext| format!(".{ext}"))
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

/// Fixed content-type table for common document types.
///
/// Reverse registry lookups can surface obscure synonym extensions first;
/// this table pins the conventional choice.
fn well_known_extension(mime: &str) -> Option<&'static str> {
    let ext = match mime {
        "text/html" => ".html",
        "text/plain" => ".txt",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/pdf" => ".pdf",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "application/zip" => ".zip",
        "application/gzip" => ".gz",
        "text/css" => ".css",
        "text/javascript" | "application/javascript" => ".js",
        "text/markdown" => ".md",
        "video/mp4" => ".mp4",
        "audio/mpeg" => ".mp3",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        _ => return None,
    };
    Some(ext)
}

/// Evidence for a file type guess, dispatched explicitly by the caller.
#[derive(Debug, Clone, Copy)]
pub enum TypeSource<'a> {
    /// The response's declared content type (before bytes hit disk).
    Headers(&'a str),
    /// A saved file whose bytes can be sniffed.
    Content(&'a Path),
}

/// Guesses a file extension (with leading dot) from the given evidence.
///
/// Returns `None` when the evidence is inconclusive; the caller decides
/// whether to defer, retry with other evidence, or give up.
#[must_use]
pub fn guess_extension(source: TypeSource<'_>, registry: &ExtensionRegistry) -> Option<String> {
    match source {
        TypeSource::Headers(content_type) => registry.extension_for_mime(content_type),
        TypeSource::Content(path) => sniff_extension(path),
    }
}

/// Determines an extension by magic-byte inspection of saved bytes.
fn sniff_extension(path: &Path) -> Option<String> {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => {
            debug!(path = %path.display(), mime = kind.mime_type(), "sniffed file type");
            Some(format!(".{}", kind.extension()))
        }
        Ok(None) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file for type sniffing");
            None
        }
    }
}

/// Progress of the two-phase extension inference for one download.
///
/// Starts at [`Unknown`] and moves forward at most once: header inference
/// before the bytes are saved, content sniffing after. Only the
/// [`ContentInferred`] transition triggers an on-disk rename - a
/// header-inferred extension is applied to the filename before saving.
///
/// [`Unknown`]: ExtensionState::Unknown
/// [`ContentInferred`]: ExtensionState::ContentInferred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionState {
    /// No extension resolved yet; inference still possible.
    Unknown,
    /// Extension derived from the response content type before saving.
    HeaderInferred(String),
    /// Extension derived by sniffing the saved bytes.
    ContentInferred(String),
    /// Both phases failed; the file stays extensionless. Not an error.
    StillUnknown,
}

impl ExtensionState {
    /// Attempts the header-based phase. Only advances from [`Unknown`];
    /// any other state passes through untouched.
    ///
    /// [`Unknown`]: ExtensionState::Unknown
    #[must_use]
    pub fn infer_from_headers(
        self,
        content_type: Option<&str>,
        registry: &ExtensionRegistry,
    ) -> Self {
        match self {
            Self::Unknown => content_type
                .and_then(|ct| guess_extension(TypeSource::Headers(ct), registry))
                .map_or(Self::Unknown, Self::HeaderInferred),
            other => other,
        }
    }

    /// Attempts the content-sniffing phase against a saved file. Advances
    /// from [`Unknown`] to either [`ContentInferred`] or [`StillUnknown`];
    /// any other state passes through untouched.
    ///
    /// [`Unknown`]: ExtensionState::Unknown
    /// [`ContentInferred`]: ExtensionState::ContentInferred
    /// [`StillUnknown`]: ExtensionState::StillUnknown
    #[must_use]
    pub fn infer_from_content(self, path: &Path, registry: &ExtensionRegistry) -> Self {
        match self {
            Self::Unknown => guess_extension(TypeSource::Content(path), registry)
                .map_or(Self::StillUnknown, Self::ContentInferred),
            other => other,
        }
    }

    /// The resolved extension, if either phase succeeded.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::HeaderInferred(ext) | Self::ContentInferred(ext) => Some(ext),
            Self::Unknown | Self::StillUnknown => None,
        }
    }
}
