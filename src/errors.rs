// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplugError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("No watch roots could be resolved: {0}")]
    NoWatchRoots(String),

    #[error("Build failed with exit code {0}")]
    BuildFailed(i32),

    #[error("Teardown failed: {0}")]
    Teardown(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplugError {
    /// Collapse a list of teardown failures into a single error.
    ///
    /// Returns `Ok(())` when the list is empty; otherwise every failure is
    /// surfaced, not just the first one.
    pub fn aggregate_teardown(failures: Vec<anyhow::Error>) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        let joined = failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ReplugError::Teardown(joined))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReplugError>;
