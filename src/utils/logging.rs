//! Structured logging configuration.
//!
//! Thin wrapper over `tracing-subscriber`: honors `RUST_LOG` when set and
//! falls back to the given directives otherwise. Initialization is
//! idempotent so tests and embedding applications can both call it.

use tracing_subscriber::EnvFilter;

/// Initialize logging at `info` level.
pub fn init() {
    init_with_filter("info");
}

/// Initialize logging with explicit filter directives, e.g.
/// `"mesh_protocol=debug"`.
pub fn init_with_filter(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
