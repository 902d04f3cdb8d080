#[cfg(feature = "map")]
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::KerbError;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to `path`. Used while the terminal belongs to the map UI.
#[cfg(feature = "map")]
pub fn init_file(path: &Path) -> Result<(), KerbError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(env_filter()),
        )
        .try_init()
        .map_err(|e| KerbError::Logging(e.to_string()))
}

/// Logs to stderr, for the one-shot commands.
pub fn init_stderr() -> Result<(), KerbError> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(env_filter()),
        )
        .try_init()
        .map_err(|e| KerbError::Logging(e.to_string()))
}
