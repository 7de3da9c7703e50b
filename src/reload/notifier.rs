// src/reload/notifier.rs

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

/// Trait abstracting the reload notifications sent to the target service.
///
/// Both operations are idempotent on the target side and best-effort from
/// the watcher's perspective: callers log failures and continue. There are
/// no retries and no timeouts.
///
/// Production code uses [`crate::reload::ReloadClient`]; tests can provide
/// their own implementation that records calls instead of talking HTTP.
pub trait ReloadNotifier: Send + Sync {
    /// Prepare the target service's runtime state for the plugin about to
    /// be hot-loaded. Sent once, before the first reload.
    fn initialize<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Ask the target service to hot-reload the named plugin. Sent after
    /// every successful build.
    fn reload<'a>(
        &'a self,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
