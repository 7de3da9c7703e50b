// src/engine/orchestrator.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::build::{BuildOutcome, BuildRequest, BuildTrigger};
use crate::engine::session::WatchSession;
use crate::engine::LoopEvent;
use crate::errors::{ReplugError, Result};
use crate::reload::ReloadNotifier;
use crate::types::RawChangeEvent;
use crate::watch::{spawn_debouncer, spawn_poller};

/// Buffered raw events between the poller and the debouncer. A single poll
/// tick over a large tree can produce a sizeable burst.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Top-level coordinator of the watch → debounce → build → reload pipeline.
///
/// Owns the session and the watcher lifecycle. The loop is strictly
/// serialized: one change-set is built and reloaded to completion before the
/// next queued emission is acted on. None of the steps has a timeout, so a
/// hung build hangs the loop; acceptable for a local developer tool.
pub struct WatchOrchestrator<B, N> {
    session: WatchSession,
    request: BuildRequest,
    target: String,
    builder: B,
    notifier: Arc<N>,
}

impl<B, N> WatchOrchestrator<B, N>
where
    B: BuildTrigger,
    N: ReloadNotifier + 'static,
{
    pub fn new(
        session: WatchSession,
        request: BuildRequest,
        target: impl Into<String>,
        builder: B,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            session,
            request,
            target: target.into(),
            builder,
            notifier,
        }
    }

    /// Run the watch loop until the loop channel closes or a
    /// [`LoopEvent::ShutdownRequested`] arrives.
    ///
    /// `loop_tx` is the sender half of `loop_rx`; the debouncer delivers
    /// into it and external code (e.g. a Ctrl-C handler) may push a
    /// shutdown event through its own clone.
    pub async fn run(
        mut self,
        loop_tx: mpsc::Sender<LoopEvent>,
        mut loop_rx: mpsc::Receiver<LoopEvent>,
    ) -> Result<()> {
        let (event_tx, event_rx) = mpsc::channel::<RawChangeEvent>(EVENT_CHANNEL_CAPACITY);

        let poller = spawn_poller(
            self.session.roots.clone(),
            self.session.filter.clone(),
            self.session.poll_interval,
            self.session.fingerprint,
            event_tx,
        );
        let debouncer = spawn_debouncer(event_rx, loop_tx, self.session.quiet_period);

        // Cold start: initialize the server and request an initial reload
        // without waiting for a first edit. Deliberately unordered relative
        // to the watch loop; both reload paths are idempotent on the server
        // side, so the race can at worst duplicate a notification.
        let cold_start = spawn_cold_start(Arc::clone(&self.notifier), self.target.clone());

        info!("watch loop started");

        loop {
            let event = match loop_rx.recv().await {
                Some(event) => event,
                None => {
                    info!("loop channel closed; exiting watch loop");
                    break;
                }
            };

            match event {
                LoopEvent::ChangesReady(set) => {
                    info!(
                        changes = set.len(),
                        paths = ?set.paths().collect::<Vec<_>>(),
                        "change set ready; triggering build"
                    );
                    self.build_and_reload(&set).await;
                }
                LoopEvent::ShutdownRequested => {
                    info!("shutdown requested; exiting watch loop");
                    break;
                }
            }
        }

        // Teardown: once this begins, no further build or reload is
        // dispatched. An in-flight build (there is none at this point, the
        // loop is serialized) would be allowed to finish.
        drop(loop_rx);
        teardown(poller, debouncer, cold_start).await
    }

    async fn build_and_reload(&mut self, set: &crate::types::ChangeSet) {
        debug_assert!(!set.is_empty());

        match self.builder.run(&self.request).await {
            Ok(BuildOutcome::Success) => {
                if let Err(err) = self.notifier.reload(&self.target).await {
                    warn!(target = %self.target, error = %err, "reload notification failed");
                }
            }
            Ok(BuildOutcome::Failed(code)) => {
                // A broken build must never push a reload signal.
                warn!(exit_code = code, "build failed; skipping reload");
            }
            Err(err) => {
                warn!(error = %err, "build error; skipping reload");
            }
        }
    }
}

/// Fire-and-forget cold-start sequence: initialize, then the first reload.
///
/// Failures are logged, never fatal; an initialize failure skips the initial
/// reload, since reloading an uninitialized server is meaningless.
fn spawn_cold_start<N: ReloadNotifier + 'static>(
    notifier: Arc<N>,
    target: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = notifier.initialize().await {
            warn!(error = %err, "initialize request failed; skipping initial reload");
            return;
        }
        if let Err(err) = notifier.reload(&target).await {
            warn!(target = %target, error = %err, "initial reload request failed");
        }
        debug!("cold start sequence finished");
    })
}

/// Stop every background task, collecting all failures instead of only the
/// first.
async fn teardown(
    poller: crate::watch::PollerHandle,
    debouncer: JoinHandle<()>,
    cold_start: JoinHandle<()>,
) -> Result<()> {
    let mut failures: Vec<anyhow::Error> = Vec::new();

    if let Err(err) = poller.stop().await {
        failures.push(err);
    }

    for (name, handle) in [("debouncer", debouncer), ("cold start", cold_start)] {
        handle.abort();
        match handle.await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => {}
            Err(err) => failures.push(anyhow::anyhow!("{name} task failed: {err}")),
        }
    }

    debug!(failures = failures.len(), "teardown complete");
    ReplugError::aggregate_teardown(failures)
}
