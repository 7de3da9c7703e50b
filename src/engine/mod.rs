// src/engine/mod.rs

//! Orchestration engine for replug.
//!
//! This module ties together:
//! - session resolution (watch roots, exclude filter, intervals)
//! - the main watch loop that reacts to:
//!   - debounced change-sets
//!   - shutdown signals
//! - the one-time cold-start initialize+reload sequence

/// Events flowing into the watch loop from the debouncer and signal
/// handlers.
#[derive(Debug)]
pub enum LoopEvent {
    /// A debounced change-set is ready to be built.
    ChangesReady(crate::types::ChangeSet),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod orchestrator;
pub mod session;

pub use orchestrator::WatchOrchestrator;
pub use session::WatchSession;
