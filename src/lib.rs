//! Docfetch Core Library
//!
//! This library prepares heterogeneous document sources for a downstream
//! text-to-graph extraction pipeline. Callers hand it a mixed batch of
//! strings (local paths, remote URLs), and it resolves them into canonical
//! URIs and ensures the remote ones exist exactly once in a local corpus
//! directory, with a correct file extension even when the source omits or
//! misreports one.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`locate`] - Location classification and URI normalization
//! - [`download`] - HTTP download engine with extension inference
//! - [`logging`] - Tracing subscriber setup for embedding applications
//!
//! Chunking, concept extraction, and graph assembly are external
//! collaborators that consume the resolved/downloaded file list.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod locate;
pub mod logging;

// Re-export commonly used types
pub use download::{
    DownloadError, DownloadStats, Downloader, ExtensionRegistry, ExtensionState, FetchOptions,
    HttpClient, TypeSource, guess_extension,
};
pub use locate::{
    LocateError, LocationKind, classify, file_uri, resolve, resolve_with_types, traverse_paths,
};
