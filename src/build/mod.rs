// src/build/mod.rs

//! Build triggering.
//!
//! The watcher only triggers the external build and waits for it to finish;
//! compiling sources and producing the packaged artifact is the build
//! tool's business.

pub mod trigger;

pub use trigger::{BuildOutcome, BuildRequest, BuildTrigger, ProcessBuildTrigger};
