// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling exclude glob patterns into a [`PathFilter`].
//! - Polling the watch roots and diffing snapshots into change events.
//! - Debouncing event bursts into single change-sets.
//!
//! It does **not** know about builds or reloads; it only turns filesystem
//! changes into change-sets for the orchestrator.

pub mod debounce;
pub mod patterns;
pub mod poller;
pub mod snapshot;

pub use debounce::{spawn_debouncer, DebounceCore};
pub use patterns::{relative_str, PathFilter, DEFAULT_EXCLUDES};
pub use poller::{spawn_poller, PollerHandle};
pub use snapshot::{compute_file_digest, DirectorySnapshot, FileFingerprint};
