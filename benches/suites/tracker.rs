// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use crate::DEFAULT_COPIES_SETS;
use criterion::{BenchmarkId, Criterion};
use seqno_checkpoint::{AllocationId, Config, GlobalCheckpointTracker, HashSet, ShardId};

pub fn bench_tracker(c: &mut Criterion) {
    bench_report_and_advance(c);
    bench_update_allocation_ids(c);
}

fn quiet_tracker() -> GlobalCheckpointTracker {
    let logger = slog::Logger::root(slog::Discard, slog::o!());
    GlobalCheckpointTracker::new(&Config::new(ShardId::new("bench", 0)), &logger).unwrap()
}

fn copies(n: usize) -> Vec<AllocationId> {
    (0..n).map(|i| AllocationId::new(format!("copy-{}", i))).collect()
}

fn bench_report_and_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("GlobalCheckpointTracker::update_checkpoint_on_primary");
    for n in DEFAULT_COPIES_SETS.iter() {
        let ids = copies(*n);
        let active: HashSet<_> = ids.iter().cloned().collect();
        let tracker = quiet_tracker();
        tracker.update_allocation_ids_from_master(&active, &HashSet::default());
        let mut seq = 0;
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| {
                seq += 1;
                for id in ids {
                    tracker.update_local_checkpoint(id, seq);
                }
                tracker.update_checkpoint_on_primary()
            })
        });
    }
    group.finish();
}

fn bench_update_allocation_ids(c: &mut Criterion) {
    let mut group = c.benchmark_group("GlobalCheckpointTracker::update_allocation_ids_from_master");
    for n in DEFAULT_COPIES_SETS.iter() {
        let ids = copies(*n);
        let full: HashSet<_> = ids.iter().cloned().collect();
        let half: HashSet<_> = ids.iter().step_by(2).cloned().collect();
        let tracker = quiet_tracker();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                tracker.update_allocation_ids_from_master(&full, &HashSet::default());
                tracker.update_allocation_ids_from_master(&half, &HashSet::default());
            })
        });
    }
    group.finish();
}
