//! Tracing setup: idempotent, honors an explicit level but falls back to
//! `RUST_LOG` when set.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber exactly once per process.
/// `level` is used as the default filter directive unless `RUST_LOG` is set.
pub fn init_tracing_once(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
