//! Tracing subscriber setup
//!
//! Shared by hosts and tests: file logging with `RUST_LOG` filtering.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber, logging to `log_file_path`.
///
/// Fails if the file cannot be created or a global subscriber is already set.
pub fn init_global(log_file_path: &Path) -> io::Result<()> {
    if let Some(parent) = log_file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = File::create(log_file_path)?;

    build_subscriber(log_file)
        .try_init()
        .map_err(io::Error::other)
}

/// Build a subscriber writing to `log_file`.
///
/// Environment-based filtering (RUST_LOG) with a DEBUG default.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into());

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
