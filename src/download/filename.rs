//! Filename derivation and base-name matching for downloads.
//!
//! Candidate filenames come from the URL's last path segment. Whether a
//! trailing dot-token counts as an extension is decided by the
//! [`ExtensionRegistry`], which makes existence checks resilient to the
//! same logical file appearing with and without an inferred extension.

use tracing::debug;
use url::Url;

use super::error::DownloadError;
use super::filetype::ExtensionRegistry;

/// Derives the candidate filename for a URL from its last path segment.
///
/// The segment is percent-decoded and sanitized. Root URLs (no usable
/// segment) fall back to a name derived from the host, so the result is
/// deterministic and usable for existence checks.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] if the URL does not parse.
pub(crate) fn candidate_filename(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

    if let Some(mut segments) = parsed.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        let decoded = urlencoding::decode(last).map_or_else(
            |e| {
                debug!(segment = %last, error = %e, "filename not valid percent-encoding, using raw");
                last.to_string()
            },
            std::borrow::Cow::into_owned,
        );
        let sanitized = sanitize_filename(&decoded);
        if !sanitized.trim_matches('_').is_empty() {
            return Ok(sanitized);
        }
    }

    // Root URLs have no path segment to name the file after.
    let host = parsed.host_str().unwrap_or("download");
    Ok(sanitize_filename(&host.replace('.', "-")))
}

/// Sanitizes a filename for filesystem safety.
///
/// Replaces path separators, characters invalid on common filesystems
/// (`: * ? " < > |`), and control characters with underscores.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Dot-only names would escape the download directory when joined
    if sanitized.chars().all(|c| c == '.') {
        return "_".repeat(sanitized.len().max(1));
    }
    sanitized
}

/// Splits a filename into stem and extension at the last dot.
///
/// The extension keeps its leading dot. A lone trailing dot, an overlong
/// token (more than 12 characters), or a leading dot (dotfile) is not
/// treated as an extension.
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => {
            let ext = &name[pos..];
            if ext.len() <= 1 || ext.len() > 12 {
                (name, None)
            } else {
                (&name[..pos], Some(ext))
            }
        }
        _ => (name, None),
    }
}

/// Base name used for fuzzy existence matching.
///
/// Strips the trailing suffix only when the registry recognizes it as a
/// genuine extension; an opaque trailing token stays part of the base.
pub(crate) fn base_name<'a>(name: &'a str, registry: &ExtensionRegistry) -> &'a str {
    match split_extension(name) {
        (stem, Some(ext)) if registry.is_known(ext) => stem,
        _ => name,
    }
}
