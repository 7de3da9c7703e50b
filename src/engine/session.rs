// src/engine/session.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ConfigFile, WatchTargetConfig};
use crate::errors::{ReplugError, Result};
use crate::watch::PathFilter;

/// Resolved, validated state of one watch session.
///
/// Resolution is pure given the filesystem: resolving the same config twice
/// yields the same roots and the same effective exclude set.
#[derive(Debug, Clone)]
pub struct WatchSession {
    /// Absolute, existing, de-duplicated watch roots.
    pub roots: Vec<PathBuf>,
    /// Compiled exclude matcher (user excludes unioned with the defaults).
    pub filter: PathFilter,
    pub poll_interval: Duration,
    pub quiet_period: Duration,
    pub fingerprint: bool,
}

impl WatchSession {
    /// Resolve the watch targets from the config into a live session.
    ///
    /// When no `[[watch.target]]` is declared, a default target covering the
    /// main source tree (minus generated console assets) is synthesized.
    /// Directories that do not exist are skipped with a warning; ending up
    /// with zero usable roots is fatal.
    pub fn resolve(project_dir: &Path, cfg: &ConfigFile) -> Result<Self> {
        let targets: Vec<WatchTargetConfig> = if cfg.watch.targets.is_empty() {
            vec![WatchTargetConfig::default_target()]
        } else {
            cfg.watch.targets.clone()
        };

        let mut roots: BTreeSet<PathBuf> = BTreeSet::new();
        let mut excludes: Vec<String> = Vec::new();

        for target in &targets {
            let name = target.name.as_deref().unwrap_or("<unnamed>");
            for dir in &target.dirs {
                let path = if Path::new(dir).is_absolute() {
                    PathBuf::from(dir)
                } else {
                    project_dir.join(dir)
                };
                match path.canonicalize() {
                    Ok(resolved) if resolved.is_dir() => {
                        debug!(target = %name, dir = ?resolved, "watch root resolved");
                        roots.insert(resolved);
                    }
                    Ok(resolved) => {
                        warn!(target = %name, dir = ?resolved, "watch entry is not a directory; skipping");
                    }
                    Err(err) => {
                        warn!(target = %name, dir = ?path, error = %err, "watch directory not resolvable; skipping");
                    }
                }
            }
            excludes.extend(target.exclude.iter().cloned());
        }

        if roots.is_empty() {
            let declared: Vec<&str> = targets
                .iter()
                .flat_map(|t| t.dirs.iter().map(|d| d.as_str()))
                .collect();
            return Err(ReplugError::NoWatchRoots(format!(
                "none of the declared watch directories exist: {declared:?}"
            )));
        }

        let filter = PathFilter::new(&excludes)?;

        let session = Self {
            roots: roots.into_iter().collect(),
            filter,
            poll_interval: Duration::from_millis(cfg.watch.poll_interval_ms),
            quiet_period: Duration::from_millis(cfg.watch.quiet_period_ms),
            fingerprint: cfg.watch.fingerprint,
        };

        info!(
            roots = ?session.roots,
            excludes = ?session.filter.patterns(),
            "watch session resolved"
        );
        Ok(session)
    }
}
