//! Logging setup with `tracing`.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `name` scopes the default directive (`{name}={default_level}`); the
/// `RUST_LOG` environment variable takes precedence when set. Calling this
/// more than once is a no-op, so test binaries can call it freely.
pub fn setup_logger(name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{name}={default_level}")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
