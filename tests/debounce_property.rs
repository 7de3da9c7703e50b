// tests/debounce_property.rs

//! Property tests for the pure debounce core: any sequence of events whose
//! gaps all stay inside the quiet window coalesces into exactly one
//! change-set containing the union of distinct paths.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use replug::types::{ChangeKind, RawChangeEvent};
use replug::watch::DebounceCore;

const QUIET_MS: u64 = 500;

fn kind_from(i: u8) -> ChangeKind {
    match i % 3 {
        0 => ChangeKind::Created,
        1 => ChangeKind::Modified,
        _ => ChangeKind::Deleted,
    }
}

proptest! {
    #[test]
    fn intra_window_burst_emits_exactly_one_set(
        // (gap before event in ms, path index, kind seed); every gap is
        // strictly inside the quiet window.
        events in prop::collection::vec((0u64..QUIET_MS, 0usize..8, 0u8..3), 1..40)
    ) {
        let quiet = Duration::from_millis(QUIET_MS);
        let mut core = DebounceCore::new(quiet);

        let start = Instant::now();
        let mut now = start;
        let mut distinct: BTreeSet<usize> = BTreeSet::new();

        for (gap_ms, idx, kind_seed) in &events {
            now += Duration::from_millis(*gap_ms);
            let event = RawChangeEvent::new(
                PathBuf::from(format!("src/file_{idx}.java")),
                kind_from(*kind_seed),
            );
            // No gap reaches the quiet window, so nothing is emittable
            // while the burst is running.
            prop_assert!(core.take_ready(now).is_none());
            core.on_event(event, now);
            distinct.insert(*idx);
        }

        let deadline = core.deadline().expect("accumulating after events");
        prop_assert_eq!(deadline, now + quiet);

        // One instant before the deadline: still nothing.
        prop_assert!(core.take_ready(deadline - Duration::from_millis(1)).is_none());

        // At the deadline: exactly one set, the union of distinct paths.
        let set = core.take_ready(deadline).expect("set at deadline");
        prop_assert_eq!(set.len(), distinct.len());
        for idx in &distinct {
            let expected = format!("src/file_{idx}.java");
            prop_assert!(set.contains(std::path::Path::new(&expected)));
        }

        // And the machine is idle again: no second emission.
        prop_assert!(!core.is_accumulating());
        prop_assert!(core.take_ready(deadline + quiet).is_none());
    }

    #[test]
    fn later_kind_supersedes_without_reordering(
        kinds in prop::collection::vec(0u8..3, 2..10)
    ) {
        let quiet = Duration::from_millis(QUIET_MS);
        let mut core = DebounceCore::new(quiet);
        let now = Instant::now();

        core.on_event(
            RawChangeEvent::new(PathBuf::from("src/a.java"), ChangeKind::Created),
            now,
        );
        for seed in &kinds {
            core.on_event(
                RawChangeEvent::new(PathBuf::from("src/b.java"), kind_from(*seed)),
                now,
            );
        }

        let set = core.take_ready(now + quiet).expect("set at deadline");
        prop_assert_eq!(set.len(), 2);

        let entries: Vec<_> = set.iter().collect();
        // Arrival order is preserved; the duplicate path keeps its slot and
        // only its kind was updated to the latest event's.
        prop_assert_eq!(entries[0].path.as_path(), std::path::Path::new("src/a.java"));
        prop_assert_eq!(entries[1].path.as_path(), std::path::Path::new("src/b.java"));
        prop_assert_eq!(entries[1].kind, kind_from(*kinds.last().unwrap()));
    }
}
