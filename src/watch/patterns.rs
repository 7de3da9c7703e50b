// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Exclude patterns that are always active, regardless of user
/// configuration: build output, build caches, IDE metadata, version
/// control, distribution output, front-end package caches and test
/// sources.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/build/**",
    "**/.gradle/**",
    "**/gradle/**",
    "**/.idea/**",
    "**/.git/**",
    "**/dist/**",
    "**/node_modules/**",
    "**/test/java/**",
    "**/test/resources/**",
];

/// Compiled exclude matcher for a watch session.
///
/// Exclusion is a pure set-membership test over the union of user-declared
/// patterns and [`DEFAULT_EXCLUDES`]: a path is excluded if it matches any
/// pattern, with no ordering or priority between patterns. Paths are
/// matched relative to a watch root, with forward slashes; `**` crosses
/// directory boundaries, `*` stays within one segment.
#[derive(Clone)]
pub struct PathFilter {
    patterns: Vec<String>,
    exclude_set: GlobSet,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    /// Compile a filter from user excludes unioned with the default set.
    pub fn new<S: AsRef<str>>(user_excludes: &[S]) -> Result<Self> {
        // BTreeSet both dedups overlapping patterns and keeps the compiled
        // order stable across sessions.
        let mut union: BTreeSet<String> = DEFAULT_EXCLUDES
            .iter()
            .map(|s| s.to_string())
            .collect();
        union.extend(user_excludes.iter().map(|s| s.as_ref().to_string()));

        let patterns: Vec<String> = union.into_iter().collect();
        let exclude_set = build_globset(&patterns)?;

        Ok(Self {
            patterns,
            exclude_set,
        })
    }

    /// Returns true if the given root-relative path matches any exclude
    /// pattern.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude_set.is_match(rel_path)
    }

    /// Returns true if a file under `root` is excluded.
    ///
    /// The patterns are tried against the root-relative path and, because
    /// patterns anchored deeper than the root (e.g. the console-assets
    /// exclude `**/src/main/resources/console/**` on a root that already is
    /// `src/main`) can only match with the root's own components present,
    /// also against the full path.
    ///
    /// Full-path matching also lets components *above* the root
    /// participate: a project checked out under a directory itself named
    /// after an exclude (e.g. `/home/ci/build/proj`) is excluded wholesale.
    pub fn excludes_path(&self, root: &Path, path: &Path) -> bool {
        if let Some(rel) = relative_str(root, path) {
            if self.is_excluded(&rel) {
                return true;
            }
        }
        let full = path.to_string_lossy().replace('\\', "/");
        self.is_excluded(&full)
    }

    /// The effective pattern set (sorted, deduplicated).
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// This is intentionally robust:
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Only if both attempts fail do we give up.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    // Fast path: path already starts with our root.
    if let Ok(rel) = path.strip_prefix(root) {
        let s = rel.to_string_lossy().replace('\\', "/");
        return Some(s);
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            let s = rel.to_string_lossy().replace('\\', "/");
            return Some(s);
        }
    }

    None
}
