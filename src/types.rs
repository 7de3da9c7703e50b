// src/types.rs

//! Shared event and change-set types used by the watch pipeline.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What happened to a file between two poll snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A single filesystem mutation observed by the poller.
///
/// Ephemeral: produced by one poll tick and consumed immediately by the
/// debouncer.
#[derive(Debug, Clone)]
pub struct RawChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub at: SystemTime,
}

impl RawChangeEvent {
    pub fn new(path: PathBuf, kind: ChangeKind) -> Self {
        Self {
            path,
            kind,
            at: SystemTime::now(),
        }
    }
}

/// One entry of a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// The deduplicated set of paths that changed since the previous emission.
///
/// Entries keep their arrival order; a later event for a path already in the
/// set updates that entry's kind in place instead of appending a duplicate.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<ChangedPath>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one event into the set.
    pub fn insert(&mut self, path: PathBuf, kind: ChangeKind) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
            existing.kind = kind;
        } else {
            self.entries.push(ChangedPath { path, kind });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangedPath> {
        self.entries.iter()
    }

    /// Changed paths in arrival order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }
}
