//! Tracing subscriber setup for embedding applications.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the application's call. This helper wires up the conventional setup:
//! an env-filtered fmt subscriber honoring `RUST_LOG`, with a fallback
//! default level.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
///
/// `default_level` applies when `RUST_LOG` is unset or unparsable (e.g.
/// `"info"` or `"docfetch=debug"`). Returns quietly if a global subscriber
/// is already installed, so it is safe to call from tests and embedding
/// code alike.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("info");
        init("debug");
    }
}
