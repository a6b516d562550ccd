//! Download engine with existence checks and extension inference.
//!
//! This module ensures that the content behind each URL in a batch exists
//! exactly once in a bound download directory:
//!
//! - [`engine`] - batch orchestration, existence matching, persistence
//! - [`client`] - HTTP client wrapper (timeouts, status mapping)
//! - [`filename`] - candidate filename derivation from URLs
//! - [`filetype`] - extension knowledge base and two-phase type inference
//! - [`error`] - download error taxonomy and the ignorable/fatal split

pub mod client;
pub mod constants;
pub mod engine;
pub mod error;
mod filename;
pub mod filetype;

pub use client::HttpClient;
pub use engine::{DownloadStats, Downloader, FetchOptions};
pub use error::DownloadError;
pub use filetype::{ExtensionRegistry, ExtensionState, TypeSource, guess_extension};
