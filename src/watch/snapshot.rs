// src/watch/snapshot.rs

//! Poll snapshots: per-file fingerprints of the watched trees and the diff
//! between two snapshots.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{trace, warn};

use crate::types::{ChangeKind, RawChangeEvent};
use crate::watch::patterns::PathFilter;

/// Cheap per-file change marker.
///
/// By default a file is considered changed when its mtime or size differ
/// between snapshots. In fingerprint mode a blake3 digest of the contents is
/// compared instead, so touching a file without changing it stays quiet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    pub modified: SystemTime,
    pub len: u64,
    pub digest: Option<String>,
}

impl FileFingerprint {
    fn differs_from(&self, other: &FileFingerprint) -> bool {
        match (&self.digest, &other.digest) {
            (Some(a), Some(b)) => a != b,
            _ => self.modified != other.modified || self.len != other.len,
        }
    }
}

/// Recursive modification state of all watch roots at one poll tick.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    files: HashMap<PathBuf, FileFingerprint>,
}

impl DirectorySnapshot {
    /// Walk every root and fingerprint the files that survive the exclude
    /// filter. Excluded paths never enter the snapshot, so they can never
    /// produce a change event later.
    ///
    /// Unreadable entries *below* a root are skipped with a warning rather
    /// than failing the whole snapshot; a file that briefly disappears
    /// mid-walk (editors do this on save) would otherwise abort the tick.
    /// An unreadable or missing root, however, fails the capture, so the
    /// caller keeps the previous snapshot instead of diffing against an
    /// empty one and reporting the whole tree as deleted.
    pub fn capture(
        roots: &[PathBuf],
        filter: &PathFilter,
        fingerprint: bool,
    ) -> io::Result<DirectorySnapshot> {
        let mut files = HashMap::new();

        for root in roots {
            // Manual stack avoids recursion depth issues on nested trees.
            let mut stack = vec![root.clone()];

            while let Some(dir) = stack.pop() {
                let entries = match std::fs::read_dir(&dir) {
                    Ok(entries) => entries,
                    Err(err) if dir == *root => return Err(err),
                    Err(err) => {
                        warn!(dir = ?dir, error = %err, "skipping unreadable directory");
                        continue;
                    }
                };

                for entry_res in entries {
                    let entry = match entry_res {
                        Ok(e) => e,
                        Err(err) => {
                            warn!(dir = ?dir, error = %err, "skipping unreadable entry");
                            continue;
                        }
                    };
                    let path = entry.path();
                    let metadata = match entry.metadata() {
                        Ok(m) => m,
                        Err(_) => continue, // removed mid-walk
                    };

                    if metadata.is_dir() {
                        stack.push(path);
                        continue;
                    }
                    if !metadata.is_file() {
                        continue;
                    }

                    if filter.excludes_path(root, &path) {
                        trace!(path = ?path, "excluded from snapshot");
                        continue;
                    }

                    let digest = if fingerprint {
                        match compute_file_digest(&path) {
                            Ok(d) => Some(d),
                            Err(_) => continue, // removed mid-walk
                        }
                    } else {
                        None
                    };

                    files.insert(
                        path,
                        FileFingerprint {
                            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                            len: metadata.len(),
                            digest,
                        },
                    );
                }
            }
        }

        Ok(DirectorySnapshot { files })
    }

    /// Diff this snapshot against a newer one, producing one event per file
    /// that was created, modified or deleted in between. Events are sorted
    /// by path so a tick's output is deterministic.
    pub fn diff(&self, newer: &DirectorySnapshot) -> Vec<RawChangeEvent> {
        let mut events = Vec::new();

        for (path, fp) in &newer.files {
            match self.files.get(path) {
                None => events.push(RawChangeEvent::new(path.clone(), ChangeKind::Created)),
                Some(old) if old.differs_from(fp) => {
                    events.push(RawChangeEvent::new(path.clone(), ChangeKind::Modified));
                }
                Some(_) => {}
            }
        }

        for path in self.files.keys() {
            if !newer.files.contains_key(path) {
                events.push(RawChangeEvent::new(path.clone(), ChangeKind::Deleted));
            }
        }

        events.sort_by(|a, b| a.path.cmp(&b.path));
        events
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Streaming blake3 digest of one file's contents.
pub fn compute_file_digest(path: &Path) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
