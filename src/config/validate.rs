// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{ReplugError, Result};

/// Semantic validation on top of the deserialized config.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_plugin(cfg)?;
    validate_build(cfg)?;
    validate_server(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_plugin(cfg: &ConfigFile) -> Result<()> {
    if cfg.plugin.name.trim().is_empty() {
        return Err(ReplugError::ConfigError(
            "[plugin].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_build(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.command.trim().is_empty() {
        return Err(ReplugError::ConfigError(
            "[build].command must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    let url = cfg.server.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ReplugError::ConfigError(format!(
            "[server].url must start with http:// or https:// (got '{url}')"
        )));
    }
    Ok(())
}

fn validate_watch(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.poll_interval_ms == 0 {
        return Err(ReplugError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.watch.quiet_period_ms == 0 {
        return Err(ReplugError::ConfigError(
            "[watch].quiet_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    for target in &cfg.watch.targets {
        if target.dirs.is_empty() {
            let name = target.name.as_deref().unwrap_or("<unnamed>");
            return Err(ReplugError::ConfigError(format!(
                "[[watch.target]] '{name}' must list at least one directory in `dirs`"
            )));
        }
    }
    Ok(())
}
