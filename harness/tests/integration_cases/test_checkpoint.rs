// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeMap;

use rand::Rng;
use seqno_checkpoint::{AllocationId, SeqNo, UNASSIGNED_SEQ_NO};

use crate::test_util::{ids, new_tracker};

#[test]
fn test_all_active_reported() {
    let tracker = new_tracker();
    tracker.update_allocation_ids_from_master(&ids(&["a1", "a2"]), &ids(&[]));
    tracker.update_local_checkpoint(&"a1".into(), 5);
    tracker.update_local_checkpoint(&"a2".into(), 7);
    assert!(tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), 5);
}

#[test]
fn test_active_never_reported() {
    let tracker = new_tracker();
    tracker.update_allocation_ids_from_master(&ids(&["a1"]), &ids(&[]));
    assert!(!tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), UNASSIGNED_SEQ_NO);
}

#[test]
fn test_lagging_in_sync_copy_holds_back() {
    let tracker = new_tracker();
    tracker.update_allocation_ids_from_master(&ids(&["a1"]), &ids(&["a2"]));
    tracker.update_local_checkpoint(&"a1".into(), 10);
    tracker.mark_allocation_id_in_sync(&"a2".into(), 3);
    assert!(tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), 3);

    // Dropping the lagging copy releases the checkpoint.
    tracker.update_allocation_ids_from_master(&ids(&["a1"]), &ids(&[]));
    assert_eq!(
        tracker.get_local_checkpoint_for_allocation_id(&"a2".into()),
        UNASSIGNED_SEQ_NO
    );
    assert!(tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), 10);
}

#[test]
fn test_report_from_ghost_copy() {
    let tracker = new_tracker();
    tracker.update_allocation_ids_from_master(&ids(&["a1"]), &ids(&[]));
    tracker.update_local_checkpoint(&"a1".into(), 4);
    assert!(tracker.update_checkpoint_on_primary());

    tracker.update_local_checkpoint(&"ghost".into(), 999);
    assert_eq!(
        tracker.get_local_checkpoint_for_allocation_id(&"ghost".into()),
        UNASSIGNED_SEQ_NO
    );
    assert!(!tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), 4);
}

#[test]
fn test_empty_tracker_does_not_advance() {
    let tracker = new_tracker();
    assert!(!tracker.update_checkpoint_on_primary());
    tracker.update_allocation_ids_from_master(&ids(&[]), &ids(&["a1"]));
    assert!(!tracker.update_checkpoint_on_primary());
    assert_eq!(tracker.get_checkpoint(), UNASSIGNED_SEQ_NO);
}

#[test]
fn test_membership_update_is_idempotent() {
    let tracker = new_tracker();
    let active = ids(&["a1", "a2"]);
    let initializing = ids(&["a3"]);
    tracker.update_allocation_ids_from_master(&active, &initializing);
    tracker.update_local_checkpoint(&"a1".into(), 6);
    tracker.mark_allocation_id_in_sync(&"a3".into(), 2);

    let before = tracker.stats();
    tracker.update_allocation_ids_from_master(&active, &initializing);
    assert_eq!(tracker.stats(), before);
}

// Drives a tracker with random operations and checks, after each step, that the
// checkpoint never decreases and that recomputation follows the minimum rule.
#[test]
fn test_random_operations() {
    let pool: Vec<AllocationId> = (0..6).map(|i| AllocationId::new(format!("c{}", i))).collect();
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let tracker = new_tracker();
        // What the tracker should hold, maintained independently.
        let mut model: BTreeMap<AllocationId, SeqNo> = BTreeMap::new();
        let mut initializing = ids(&[]);
        let mut last = tracker.get_checkpoint();

        for _ in 0..200 {
            match rng.gen_range(0, 10) {
                0 => {
                    let active: seqno_checkpoint::HashSet<_> =
                        pool.iter().filter(|_| rng.gen_bool(0.6)).cloned().collect();
                    initializing = pool
                        .iter()
                        .filter(|id| !active.contains(*id) && rng.gen_bool(0.5))
                        .cloned()
                        .collect();
                    model.retain(|id, _| active.contains(id) || initializing.contains(id));
                    for id in &active {
                        model.entry(id.clone()).or_insert(UNASSIGNED_SEQ_NO);
                    }
                    tracker.update_allocation_ids_from_master(&active, &initializing);
                }
                1 => {
                    let id = &pool[rng.gen_range(0, pool.len())];
                    let seed = rng.gen_range(-1, 100);
                    if initializing.contains(id) {
                        model.insert(id.clone(), seed);
                    }
                    tracker.mark_allocation_id_in_sync(id, seed);
                }
                2..=6 => {
                    let id = &pool[rng.gen_range(0, pool.len())];
                    let checkpoint = rng.gen_range(-1, 100);
                    if let Some(v) = model.get_mut(id) {
                        *v = (*v).max(checkpoint);
                    }
                    tracker.update_local_checkpoint(id, checkpoint);
                }
                _ => {
                    let min = model.values().min().cloned();
                    let expected = matches!(min, Some(m) if m > last);
                    assert_eq!(tracker.update_checkpoint_on_primary(), expected);
                    if expected {
                        assert_eq!(Some(tracker.get_checkpoint()), min);
                    }
                }
            }

            let current = tracker.get_checkpoint();
            assert!(current >= last, "checkpoint went from {} to {}", last, current);
            last = current;

            for id in &pool {
                let want = model.get(id).cloned().unwrap_or(UNASSIGNED_SEQ_NO);
                assert_eq!(tracker.get_local_checkpoint_for_allocation_id(id), want);
            }
        }
    }
}
