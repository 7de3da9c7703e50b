// src/watch/poller.rs

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::types::RawChangeEvent;
use crate::watch::patterns::PathFilter;
use crate::watch::snapshot::DirectorySnapshot;

/// Handle for the poll loop.
///
/// This exists mainly so the polling task can be stopped deterministically
/// at teardown. The loop also stops on its own once the event channel
/// closes.
#[derive(Debug)]
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the poll loop and wait for it to finish.
    ///
    /// Returns an error only if the polling task panicked; a task that was
    /// simply cancelled counts as a clean stop.
    pub async fn stop(self) -> anyhow::Result<()> {
        self.handle.abort();
        match self.handle.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(anyhow::anyhow!("poller task failed: {err}")),
        }
    }
}

/// Spawn the snapshot-diff poll loop.
///
/// The first snapshot is the baseline: files that already exist when
/// watching starts do not produce events. Every `poll_interval` thereafter
/// the roots are re-captured on the blocking pool and diffed against the
/// previous snapshot; each resulting event is sent into `event_tx`.
///
/// Polling is deliberate here: the watched tree may live on container
/// mounts or network volumes where native event delivery is unreliable.
/// The interval bounds worst-case detection latency.
pub fn spawn_poller(
    roots: Vec<PathBuf>,
    filter: PathFilter,
    poll_interval: Duration,
    fingerprint: bool,
    event_tx: mpsc::Sender<RawChangeEvent>,
) -> PollerHandle {
    let handle = tokio::spawn(async move {
        info!(roots = ?roots, "poll watcher started");

        let mut previous =
            match capture(roots.clone(), filter.clone(), fingerprint).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    // Fall back to an empty baseline; the next successful
                    // tick will report the whole tree as created, which at
                    // worst costs one extra rebuild.
                    warn!(error = %err, "initial snapshot failed; starting from empty baseline");
                    DirectorySnapshot::default()
                }
            };

        let mut ticker = time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a fresh interval completes immediately; the
        // baseline above already covers it.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let current = match capture(roots.clone(), filter.clone(), fingerprint).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(error = %err, "snapshot failed; keeping previous state");
                    continue;
                }
            };

            for event in previous.diff(&current) {
                debug!(path = ?event.path, kind = ?event.kind, "change detected");
                if event_tx.send(event).await.is_err() {
                    debug!("event channel closed; stopping poller");
                    return;
                }
            }

            previous = current;
        }
    });

    PollerHandle { handle }
}

async fn capture(
    roots: Vec<PathBuf>,
    filter: PathFilter,
    fingerprint: bool,
) -> io::Result<DirectorySnapshot> {
    tokio::task::spawn_blocking(move || DirectorySnapshot::capture(&roots, &filter, fingerprint))
        .await
        .unwrap_or_else(|err| Err(io::Error::other(format!("snapshot task panicked: {err}"))))
}
