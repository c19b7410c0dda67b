//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, honoring `RUST_LOG` if set
/// and falling back to `default_level` (the config file's `log_level`)
/// otherwise.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
