// src/reload/mod.rs

//! Reload notifications to the running target service.
//!
//! Fire-and-forget-with-error-logging from the watcher's perspective: a
//! failed notification never aborts the watch loop or the build path.

pub mod client;
pub mod notifier;

pub use client::ReloadClient;
pub use notifier::ReloadNotifier;
