// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

/*!

This module contains various testing harness utilities for the global checkpoint tracker.

> If you want to build the crate with a testing harness, this is the crate you want.

A [`Shard`] wires a primary's tracker to a set of simulated copies and a coordinator
view, so tests can drive writes, recoveries, failures and relocations the way a host
would, and check the global checkpoint at every step.

*/

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use seqno_checkpoint::{
    AllocationId, Config, GlobalCheckpointTracker, HashSet, SeqNo, ShardId, NO_OPS_PERFORMED,
};
use slog::{o, Logger};

/// A simulated copy of the shard.
pub struct ShardCopy {
    /// Highest sequence number persisted without gaps.
    pub local_checkpoint: SeqNo,
    /// The copy's own tracker, fed the primary's global checkpoint.
    pub tracker: GlobalCheckpointTracker,
}

impl ShardCopy {
    fn new(shard_id: &ShardId, logger: &Logger) -> ShardCopy {
        let config = Config::new(shard_id.clone());
        ShardCopy {
            local_checkpoint: NO_OPS_PERFORMED,
            // Configs built from `Config::new` always validate.
            tracker: GlobalCheckpointTracker::new(&config, logger).unwrap(),
        }
    }
}

/// The replica set as the coordinator sees it.
#[derive(Default, Clone, Debug)]
pub struct Coordinator {
    /// Copies counted in the durability quorum.
    pub active: HashSet<AllocationId>,
    /// Copies that are recovering.
    pub initializing: HashSet<AllocationId>,
}

/// A shard with one primary and any number of replicas.
///
/// Every change to the replica set is published to the primary's tracker right away.
pub struct Shard {
    /// The primary copy.
    pub primary: AllocationId,
    /// The primary's tracker.
    pub tracker: GlobalCheckpointTracker,
    /// Every copy, including the primary.
    pub copies: BTreeMap<AllocationId, ShardCopy>,
    /// The latest replica set.
    pub coordinator: Coordinator,
    max_seq_no: SeqNo,
    logger: Logger,
}

impl Shard {
    /// Creates a shard whose only copy is the primary.
    pub fn new(primary: &str, logger: &Logger) -> Shard {
        let shard_id = ShardId::new("harness", 0);
        let logger = logger.new(o!("harness" => "shard"));
        let config = Config::new(shard_id.clone());
        let tracker = GlobalCheckpointTracker::new(&config, &logger).unwrap();
        let primary = AllocationId::from(primary);

        let mut copies = BTreeMap::new();
        copies.insert(primary.clone(), ShardCopy::new(&shard_id, &logger));
        let mut shard = Shard {
            primary: primary.clone(),
            tracker,
            copies,
            coordinator: Coordinator::default(),
            max_seq_no: NO_OPS_PERFORMED,
            logger,
        };
        shard.coordinator.active.insert(primary.clone());
        shard.publish();
        shard.report(&primary);
        shard
    }

    /// The highest sequence number handed out so far.
    pub fn max_seq_no(&self) -> SeqNo {
        self.max_seq_no
    }

    /// Pushes the coordinator's view to the primary's tracker.
    pub fn publish(&self) {
        self.tracker.update_allocation_ids_from_master(
            &self.coordinator.active,
            &self.coordinator.initializing,
        );
    }

    fn report(&self, id: &AllocationId) {
        if let Some(copy) = self.copies.get(id) {
            self.tracker
                .update_local_checkpoint(id, copy.local_checkpoint);
        }
    }

    /// Adds a recovering copy. It receives new writes but does not count until
    /// [`finish_recovery`](Shard::finish_recovery).
    pub fn add_replica(&mut self, id: &str) {
        let id = AllocationId::from(id);
        let copy = ShardCopy::new(self.tracker.shard_id(), &self.logger);
        self.copies.insert(id.clone(), copy);
        self.coordinator.initializing.insert(id);
        self.publish();
    }

    /// Copies every operation the primary has to `id`, marks it in sync and has the
    /// coordinator activate it.
    pub fn finish_recovery(&mut self, id: &str) {
        let id = AllocationId::from(id);
        let max_seq_no = self.max_seq_no;
        let local_checkpoint = match self.copies.get_mut(&id) {
            Some(copy) => {
                copy.local_checkpoint = max_seq_no;
                copy.local_checkpoint
            }
            None => return,
        };
        self.tracker.mark_allocation_id_in_sync(&id, local_checkpoint);
        if self.coordinator.initializing.remove(&id) {
            self.coordinator.active.insert(id);
        }
        self.publish();
    }

    /// Has the coordinator drop a copy, as it does when a node fails.
    pub fn fail(&mut self, id: &str) {
        let id = AllocationId::from(id);
        self.copies.remove(&id);
        self.coordinator.active.remove(&id);
        self.coordinator.initializing.remove(&id);
        self.publish();
    }

    /// Moves the copy `from` to a new copy `to`: the target recovers, then the source
    /// is dropped.
    pub fn relocate(&mut self, from: &str, to: &str) {
        self.add_replica(to);
        self.finish_recovery(to);
        self.fail(from);
    }

    /// Indexes `n` operations. Every copy persists them, except those in `lagging`,
    /// which keep their local checkpoint. Reports go out in order, then the primary
    /// recomputes the global checkpoint and ships it to every copy.
    pub fn index(&mut self, n: usize, lagging: &[&str]) -> bool {
        let lagging: Vec<AllocationId> = lagging
            .iter()
            .map(|id| AllocationId::from(*id))
            .collect();
        self.max_seq_no += n as SeqNo;
        let max_seq_no = self.max_seq_no;
        for (id, copy) in self.copies.iter_mut() {
            if !lagging.contains(id) {
                copy.local_checkpoint = max_seq_no;
            }
        }
        let ids: Vec<AllocationId> = self.copies.keys().cloned().collect();
        for id in &ids {
            self.report(id);
        }
        self.sync()
    }

    /// Like [`index`](Shard::index), but reports reach the primary shuffled, and some
    /// of them twice. Each copy reports every intermediate checkpoint.
    pub fn index_out_of_order<R: Rng>(&mut self, rng: &mut R, n: usize) -> bool {
        let mut reports = vec![];
        for _ in 0..n {
            self.max_seq_no += 1;
            for (id, copy) in self.copies.iter_mut() {
                copy.local_checkpoint = self.max_seq_no;
                reports.push((id.clone(), copy.local_checkpoint));
                if rng.gen_bool(0.2) {
                    reports.push((id.clone(), copy.local_checkpoint));
                }
            }
        }
        reports.shuffle(rng);
        for (id, checkpoint) in &reports {
            self.tracker.update_local_checkpoint(id, *checkpoint);
        }
        self.sync()
    }

    /// Recomputes the global checkpoint on the primary and ships it to every copy.
    /// Returns true if it moved.
    pub fn sync(&self) -> bool {
        let advanced = self.tracker.update_checkpoint_on_primary();
        let global_checkpoint = self.tracker.get_checkpoint();
        for copy in self.copies.values() {
            copy.tracker.update_checkpoint_on_replica(global_checkpoint);
        }
        advanced
    }

    /// The global checkpoint as seen by the copy `id`.
    pub fn checkpoint_on(&self, id: &str) -> Option<SeqNo> {
        self.copies
            .get(&AllocationId::from(id))
            .map(|copy| copy.tracker.get_checkpoint())
    }
}
