//! Tracing subscriber setup.
//!
//! Call one of these once at startup, before building the [`App`](crate::app::App).
//! The level is controlled through `RUST_LOG`, e.g.
//!
//! ```bash
//! RUST_LOG=bijou=debug,tower_http=debug,sqlx=warn cargo run
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize formatted logging to stdout.
///
/// Defaults to `info` when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber was already installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging, for log aggregation in production.
///
/// # Panics
///
/// Panics if a global subscriber was already installed.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
