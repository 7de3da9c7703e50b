// src/watch/debounce.rs

//! Quiet-period debouncing of raw change events.
//!
//! The semantics live in [`DebounceCore`], a pure two-state machine
//! (idle / accumulating) that can be unit tested without Tokio, channels or
//! clocks. [`spawn_debouncer`] is the async shell that feeds it from the
//! poller channel and delivers emitted change-sets into the orchestrator
//! loop.

use std::mem;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::engine::LoopEvent;
use crate::types::{ChangeSet, RawChangeEvent};

/// Pure debounce state machine.
///
/// - Idle + event: start accumulating, arm the quiet-period deadline.
/// - Accumulating + event: merge the path into the pending set (dedup by
///   path, later kind supersedes) and re-arm the deadline.
/// - Accumulating + deadline elapsed: emit the pending set as one
///   [`ChangeSet`] and return to idle.
///
/// The timer restarts on every event and there is no maximum accumulation
/// window: a continuous stream of edits defers emission indefinitely.
/// Memory is bounded by the number of distinct paths touched, not by event
/// count.
#[derive(Debug)]
pub struct DebounceCore {
    quiet_period: Duration,
    pending: ChangeSet,
    deadline: Option<Instant>,
}

impl DebounceCore {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: ChangeSet::new(),
            deadline: None,
        }
    }

    /// Merge one raw event into the pending set and re-arm the deadline.
    pub fn on_event(&mut self, event: RawChangeEvent, now: Instant) {
        trace!(path = ?event.path, kind = ?event.kind, at = ?event.at, "debouncing event");
        self.pending.insert(event.path, event.kind);
        self.deadline = Some(now + self.quiet_period);
    }

    /// The instant at which the pending set becomes emittable, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_accumulating(&self) -> bool {
        self.deadline.is_some()
    }

    /// Emit the pending set if the quiet period has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<ChangeSet> {
        match self.deadline {
            Some(deadline) if now >= deadline && !self.pending.is_empty() => {
                self.deadline = None;
                Some(mem::take(&mut self.pending))
            }
            _ => None,
        }
    }

    /// Emit whatever is pending regardless of the deadline.
    ///
    /// Used when the event source shuts down, so a tail burst is not
    /// silently dropped.
    pub fn flush(&mut self) -> Option<ChangeSet> {
        self.deadline = None;
        if self.pending.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.pending))
        }
    }
}

/// Spawn the debounce loop between the poller and the orchestrator.
///
/// Delivery into `loop_tx` is allowed to block when the orchestrator is
/// busy with a build; while it does, raw events keep being consumed and
/// accumulated toward the next emission, so no change is ever lost.
pub fn spawn_debouncer(
    mut event_rx: mpsc::Receiver<RawChangeEvent>,
    loop_tx: mpsc::Sender<LoopEvent>,
    quiet_period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut core = DebounceCore::new(quiet_period);

        loop {
            match core.deadline() {
                None => match event_rx.recv().await {
                    Some(event) => core.on_event(event, Instant::now()),
                    None => break,
                },
                Some(deadline) => {
                    tokio::select! {
                        event = event_rx.recv() => match event {
                            Some(event) => core.on_event(event, Instant::now()),
                            None => break,
                        },
                        _ = time::sleep_until(deadline) => {
                            if let Some(set) = core.take_ready(Instant::now()) {
                                debug!(changes = set.len(), "quiet period elapsed; emitting change set");
                                if !deliver(&mut core, &mut event_rx, &loop_tx, set).await {
                                    debug!("loop channel closed; stopping debouncer");
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        }

        // Event source gone; emit a pending tail burst before exiting.
        if let Some(set) = core.flush() {
            let _ = loop_tx.send(LoopEvent::ChangesReady(set)).await;
        }
        debug!("debounce loop finished");
    })
}

/// Deliver one emitted change-set, accumulating further raw events while
/// the loop channel is full. Returns false when the loop channel is closed.
async fn deliver(
    core: &mut DebounceCore,
    event_rx: &mut mpsc::Receiver<RawChangeEvent>,
    loop_tx: &mpsc::Sender<LoopEvent>,
    set: ChangeSet,
) -> bool {
    let mut outgoing = Some(set);
    let mut source_open = true;

    while let Some(set) = outgoing.take() {
        if !source_open {
            return loop_tx.send(LoopEvent::ChangesReady(set)).await.is_ok();
        }

        tokio::select! {
            permit = loop_tx.reserve() => match permit {
                Ok(permit) => {
                    permit.send(LoopEvent::ChangesReady(set));
                    return true;
                }
                Err(_) => return false,
            },
            event = event_rx.recv() => {
                match event {
                    Some(event) => core.on_event(event, Instant::now()),
                    None => source_open = false,
                }
                outgoing = Some(set);
            }
        }
    }

    true
}
