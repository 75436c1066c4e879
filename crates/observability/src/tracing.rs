//! Tracing/logging initialization.
//!
//! Filtering is controlled by `RUST_LOG` (default `info`). Auth decisions are
//! emitted by `warden_auth` / `warden_api` targets, e.g.
//! `RUST_LOG=info,warden_auth=debug` shows why individual tokens were rejected.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON logs + timestamps, configurable via `RUST_LOG`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

/// Compact, human-readable logs.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .compact()
        .try_init();
}
