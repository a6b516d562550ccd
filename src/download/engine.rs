//! Download engine: batch fetching with existence checks and extension
//! inference.
//!
//! The engine is bound to one flat download directory and processes URLs
//! sequentially, in input order. For each URL it derives a candidate
//! filename, skips the fetch when an equivalent file is already present
//! (exact or fuzzy base-name match), and otherwise fetches the resource,
//! resolving a correct extension from headers or saved bytes when the URL
//! carries none.
//!
//! # Example
//!
//! ```no_run
//! use docfetch::download::{Downloader, ExtensionRegistry, FetchOptions};
//!
//! # async fn example() -> Result<(), docfetch::DownloadError> {
//! let downloader = Downloader::new(
//!     "./corpus",
//!     ExtensionRegistry::system(),
//!     FetchOptions::default(),
//! )?;
//! let urls = vec!["https://example.com/paper.pdf".to_string()];
//! let stats = downloader.download_all(&urls).await?;
//! println!("completed: {}, skipped: {}", stats.completed(), stats.skipped());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::client::HttpClient;
use super::error::DownloadError;
use super::filename::{base_name, candidate_filename, split_extension};
use super::filetype::{ExtensionRegistry, ExtensionState};

/// Behavior knobs for a download batch.
///
/// Serde-derived so embedding applications can keep these in their config
/// files. Defaults: buffered body, strict errors, existence checking on,
/// no progress bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Stream the response body to disk instead of buffering it in memory.
    pub stream: bool,
    /// Write-buffer capacity for streamed downloads. The transport decides
    /// how large each network chunk is; this governs how the received bytes
    /// are batched onto disk. `None` leaves the buffer size to the writer.
    /// Only relevant when `stream` is true.
    pub chunk_size: Option<usize>,
    /// Log transport/HTTP failures and continue the batch instead of
    /// aborting on the first one.
    pub ignore_errors: bool,
    /// Skip URLs whose content already exists in the download directory.
    pub check_existing: bool,
    /// Show a progress bar during batch downloads (cosmetic).
    pub progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            stream: false,
            chunk_size: None,
            ignore_errors: false,
            check_existing: true,
            progress: false,
        }
    }
}

/// Statistics from a download batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    completed: usize,
    skipped: usize,
    failed: usize,
}

impl DownloadStats {
    /// Returns the number of files actually fetched and saved.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Returns the number of URLs skipped because an equivalent file
    /// already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the number of failed downloads (only nonzero when
    /// `ignore_errors` is set; otherwise the first failure aborts).
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the total number of URLs processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

/// Per-URL processing outcome, before the ignore-errors policy is applied.
#[derive(Debug)]
enum Outcome {
    Skipped,
    Downloaded(PathBuf),
}

/// Download engine bound to one target directory.
///
/// The directory must exist at construction time; this engine never
/// creates directories. The directory listing itself is the existence
/// index - no manifest is kept, and every batch re-scans it.
#[derive(Debug)]
pub struct Downloader {
    dir: PathBuf,
    client: HttpClient,
    registry: ExtensionRegistry,
    options: FetchOptions,
}

impl Downloader {
    /// Creates a download engine for an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MissingDirectory`] if `dir` does not exist
    /// or is not a directory. Directory creation is deliberately the
    /// caller's responsibility.
    #[instrument(skip(registry, options))]
    pub fn new(
        dir: impl Into<PathBuf> + std::fmt::Debug,
        registry: ExtensionRegistry,
        options: FetchOptions,
    ) -> Result<Self, DownloadError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DownloadError::missing_directory(dir));
        }
        debug!(dir = %dir.display(), "download engine ready");
        Ok(Self {
            dir,
            client: HttpClient::new(),
            registry,
            options,
        })
    }

    /// Replaces the HTTP client (custom timeouts, shared pools).
    #[must_use]
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    /// Returns the bound download directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the configured options.
    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Ensures every URL's content exists locally exactly once.
    ///
    /// URLs are processed sequentially in input order. With
    /// `check_existing` set, a URL is skipped when a file with the same
    /// name, or the same base name modulo a recognized extension, is
    /// already present.
    ///
    /// # Errors
    ///
    /// With `ignore_errors` false (the default), the first transport/HTTP
    /// failure aborts the batch and propagates. With it set, such failures
    /// are logged and counted in [`DownloadStats::failed`]. Filesystem and
    /// configuration errors always propagate.
    #[instrument(skip(self, urls), fields(count = urls.len(), dir = %self.dir.display()))]
    pub async fn download_all(&self, urls: &[String]) -> Result<DownloadStats, DownloadError> {
        let mut stats = DownloadStats::default();
        info!("starting download batch");
        let bar = batch_bar(self.options.progress, urls.len());

        for url in urls {
            bar.set_message(display_host(url));
            match self.process_one(url).await {
                Ok(Outcome::Skipped) => {
                    stats.skipped += 1;
                }
                Ok(Outcome::Downloaded(path)) => {
                    debug!(url = %url, path = %path.display(), "downloaded");
                    stats.completed += 1;
                }
                Err(e) if self.options.ignore_errors && e.is_ignorable() => {
                    info!(url = %url, error = %e, "download failed, continuing batch");
                    stats.failed += 1;
                }
                Err(e) => {
                    bar.abandon();
                    return Err(e);
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        info!(
            completed = stats.completed(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            "download batch complete"
        );
        Ok(stats)
    }

    /// Fetches one URL and persists it, without an existence check.
    ///
    /// Returns `Ok(true)` on success. With `ignore_errors` set,
    /// transport/HTTP failures are logged at info level and reported as
    /// `Ok(false)` instead of raising.
    ///
    /// # Errors
    ///
    /// Transport/HTTP failures when `ignore_errors` is false; filesystem
    /// errors always.
    pub async fn fetch_and_save(&self, url: &str) -> Result<bool, DownloadError> {
        match self.fetch_one(url).await {
            Ok(_path) => Ok(true),
            Err(e) if self.options.ignore_errors && e.is_ignorable() => {
                info!(url = %url, error = %e, "ignoring failed download");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn process_one(&self, url: &str) -> Result<Outcome, DownloadError> {
        if self.options.check_existing && self.existing_match(url)? {
            debug!(url = %url, "already present, skipping");
            return Ok(Outcome::Skipped);
        }
        self.fetch_one(url).await.map(Outcome::Downloaded)
    }

    /// Checks whether an equivalent file already exists in the directory.
    ///
    /// Exact filename match first; failing that, a fuzzy pass comparing
    /// base names with recognized extensions stripped on both sides.
    fn existing_match(&self, url: &str) -> Result<bool, DownloadError> {
        let candidate = candidate_filename(url)?;
        if self.dir.join(&candidate).exists() {
            debug!(url = %url, file = %candidate, "exact filename match");
            return Ok(true);
        }

        let target = base_name(&candidate, &self.registry);
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| DownloadError::io(self.dir.clone(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| DownloadError::io(self.dir.clone(), e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if base_name(name, &self.registry) == target {
                debug!(url = %url, existing = %name, candidate = %candidate, "fuzzy base-name match");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Performs the fetch, extension resolution, and persistence for one URL.
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_one(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let candidate = candidate_filename(url)?;
        let response = self.client.get(url).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        let mut filename = candidate.clone();
        let mut state = ExtensionState::Unknown;
        let needs_inference = match split_extension(&candidate).1 {
            Some(ext) if self.registry.is_known(ext) => false,
            Some(token) => {
                // An unrecognized trailing token is more likely part of the
                // filename than an extension; only the saved bytes can tell.
                debug!(token = %token, "trailing token not a known extension, deferring to content sniffing");
                true
            }
            None => {
                state = state.infer_from_headers(content_type.as_deref(), &self.registry);
                if let ExtensionState::HeaderInferred(inferred) = &state {
                    debug!(extension = %inferred, "extension inferred from content type");
                    filename.push_str(inferred);
                }
                true
            }
        };

        let path = self.dir.join(&filename);
        if self.options.stream {
            stream_to_file(response, &path, self.options.chunk_size).await?;
        } else {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| DownloadError::network(url, e))?;
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                // Same contract as the streamed path: never leave partial
                // data where an existence check would find it
                let _ = tokio::fs::remove_file(&path).await;
                return Err(DownloadError::io(path.clone(), e));
            }
        }

        if !needs_inference || state != ExtensionState::Unknown {
            info!(path = %path.display(), "download complete");
            return Ok(path);
        }

        // Deferred phase: the bytes are on disk, sniff them.
        match state.infer_from_content(&path, &self.registry) {
            ExtensionState::ContentInferred(ext) => {
                let renamed = self.dir.join(format!("{filename}{ext}"));
                tokio::fs::rename(&path, &renamed)
                    .await
                    .map_err(|e| DownloadError::io(renamed.clone(), e))?;
                info!(path = %renamed.display(), extension = %ext, "download complete, extension sniffed from content");
                Ok(renamed)
            }
            _ => {
                info!(path = %path.display(), "file type unknown, keeping file without extension");
                Ok(path)
            }
        }
    }
}

/// Streams the response body to a file, returning bytes written.
///
/// On error the partial file is removed so incomplete data never pollutes
/// the existence index.
async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    chunk_size: Option<usize>,
) -> Result<u64, DownloadError> {
    let url = response.url().to_string();
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;
    let mut writer = match chunk_size {
        Some(size) if size > 0 => BufWriter::with_capacity(size, file),
        _ => BufWriter::new(file),
    };
    let mut stream = response.bytes_stream();

    let written: Result<u64, DownloadError> = async {
        let mut bytes_written: u64 = 0;
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::network(&url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;
            bytes_written += chunk.len() as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;
        Ok(bytes_written)
    }
    .await;

    match written {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
            Err(e)
        }
    }
}

/// Batch progress bar; hidden when disabled.
fn batch_bar(enabled: bool, total: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Host name shown next to the progress bar.
fn display_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(std::string::ToString::to_string))
        .unwrap_or_else(|| "download".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_downloader(dir: &Path) -> Downloader {
        Downloader::new(dir, ExtensionRegistry::system(), FetchOptions::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let result = Downloader::new(
            "/definitely/not/a/real/dir",
            ExtensionRegistry::system(),
            FetchOptions::default(),
        );
        match result {
            Err(DownloadError::MissingDirectory { path }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/a/real/dir"));
            }
            other => panic!("expected MissingDirectory, got: {other:?}"),
        }
    }

    #[test]
    fn test_new_accepts_existing_directory() {
        let dir = TempDir::new().unwrap();
        let downloader = test_downloader(dir.path());
        assert_eq!(downloader.dir(), dir.path());
    }

    #[test]
    fn test_existing_match_exact() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        let downloader = test_downloader(dir.path());
        assert!(
            downloader
                .existing_match("https://example.com/docs/report.pdf")
                .unwrap()
        );
    }

    #[test]
    fn test_existing_match_fuzzy_ignores_recognized_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        let downloader = test_downloader(dir.path());
        // Candidate "report" has no extension; existing "report.pdf" strips
        // to the same base
        assert!(
            downloader
                .existing_match("https://example.com/docs/report")
                .unwrap()
        );
    }

    #[test]
    fn test_existing_match_does_not_strip_opaque_tokens() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("release.data01"), b"x").unwrap();
        let downloader = test_downloader(dir.path());
        // "release" does not match "release.data01": the token is not a
        // recognized extension, so it stays part of the base name
        assert!(
            !downloader
                .existing_match("https://example.com/release")
                .unwrap()
        );
        // The full name still matches exactly
        assert!(
            downloader
                .existing_match("https://example.com/release.data01")
                .unwrap()
        );
    }

    #[test]
    fn test_existing_match_empty_directory() {
        let dir = TempDir::new().unwrap();
        let downloader = test_downloader(dir.path());
        assert!(
            !downloader
                .existing_match("https://example.com/report.pdf")
                .unwrap()
        );
    }

    #[test]
    fn test_existing_match_invalid_url_errors() {
        let dir = TempDir::new().unwrap();
        let downloader = test_downloader(dir.path());
        assert!(matches!(
            downloader.existing_match("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_stats_accessors() {
        let stats = DownloadStats {
            completed: 2,
            skipped: 3,
            failed: 1,
        };
        assert_eq!(stats.completed(), 2);
        assert_eq!(stats.skipped(), 3);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn test_fetch_options_defaults() {
        let options = FetchOptions::default();
        assert!(!options.stream);
        assert!(options.chunk_size.is_none());
        assert!(!options.ignore_errors);
        assert!(options.check_existing);
        assert!(!options.progress);
    }

    #[test]
    fn test_display_host() {
        assert_eq!(display_host("https://example.com/a.pdf"), "example.com");
        assert_eq!(display_host("garbage"), "download");
    }
}
