//! Tracing initialization, a thin `tracing-subscriber` setup shared by the
//! demo binaries and integration tests.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber reading its level from `RUST_LOG`
/// (default `info`). Safe to call more than once; subsequent calls are a
/// no-op so library consumers who already installed their own subscriber
/// aren't overridden.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
