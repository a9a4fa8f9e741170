// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use slog::Logger;

use crate::checkpoint::SeqNo;
use crate::config::Config;
use crate::errors::Result;
use crate::shard::{AllocationId, ShardId};
use crate::stats::CheckpointStats;
use crate::tracker::{MembershipView, ProgressTracker};
use crate::HashSet;

/// The shared, per-shard entry point for global checkpoint tracking.
///
/// The write path, peer recovery and the coordinator call into the same instance from
/// their own threads. Every mutation runs under one lock, so no caller observes a half
/// applied membership swap or recomputation. The global checkpoint is also published to
/// an atomic after each mutation, which makes [`get_checkpoint`] lock-free.
///
/// [`get_checkpoint`]: GlobalCheckpointTracker::get_checkpoint
pub struct GlobalCheckpointTracker {
    shard_id: ShardId,
    inner: Mutex<ProgressTracker>,
    published: AtomicI64,
}

impl GlobalCheckpointTracker {
    /// Creates a tracker for the shard named in `config`.
    pub fn new(config: &Config, logger: &Logger) -> Result<Self> {
        config.validate()?;
        let logger = logger.new(o!("shard_id" => config.shard_id.to_string()));
        info!(
            logger,
            "created global checkpoint tracker";
            "global_checkpoint" => config.initial_global_checkpoint,
        );
        Ok(GlobalCheckpointTracker {
            shard_id: config.shard_id.clone(),
            inner: Mutex::new(ProgressTracker::new(
                config.initial_global_checkpoint,
                logger,
            )),
            published: AtomicI64::new(config.initial_global_checkpoint),
        })
    }

    /// The shard this tracker belongs to.
    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    fn lock(&self) -> MutexGuard<'_, ProgressTracker> {
        // Every operation leaves the tracker consistent, so a poisoned lock is usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, tracker: &ProgressTracker) {
        self.published
            .store(tracker.global_checkpoint(), Ordering::Release);
    }

    /// Applies the coordinator's latest view of the shard's copies.
    ///
    /// See [`ProgressTracker::update_allocation_ids_from_master`].
    pub fn update_allocation_ids_from_master(
        &self,
        active: &HashSet<AllocationId>,
        initializing: &HashSet<AllocationId>,
    ) {
        self.lock()
            .update_allocation_ids_from_master(active, initializing);
    }

    /// Marks an initializing copy as in sync, seeding its local checkpoint. A no-op if
    /// the copy is not initializing in the latest view.
    pub fn mark_allocation_id_in_sync(&self, id: &AllocationId, local_checkpoint: SeqNo) {
        self.lock().mark_allocation_id_in_sync(id, local_checkpoint);
    }

    /// Records a local checkpoint reported by a copy. A no-op if the copy is not tracked.
    pub fn update_local_checkpoint(&self, id: &AllocationId, local_checkpoint: SeqNo) {
        self.lock().update_local_checkpoint(id, local_checkpoint);
    }

    /// Recomputes the global checkpoint; returns true if it moved forward.
    pub fn update_checkpoint_on_primary(&self) -> bool {
        let mut tracker = self.lock();
        let advanced = tracker.update_checkpoint_on_primary();
        if advanced {
            self.publish(&tracker);
        }
        advanced
    }

    /// Adopts a global checkpoint received from the primary; returns true if it moved
    /// forward. A no-op while the tracker tracks copies.
    pub fn update_checkpoint_on_replica(&self, global_checkpoint: SeqNo) -> bool {
        let mut tracker = self.lock();
        let advanced = tracker.update_checkpoint_on_replica(global_checkpoint);
        if advanced {
            self.publish(&tracker);
        }
        advanced
    }

    /// Returns the global checkpoint without taking the lock.
    #[inline]
    pub fn get_checkpoint(&self) -> SeqNo {
        self.published.load(Ordering::Acquire)
    }

    /// Returns the local checkpoint of a tracked copy, or `UNASSIGNED_SEQ_NO`.
    pub fn get_local_checkpoint_for_allocation_id(&self, id: &AllocationId) -> SeqNo {
        self.lock().local_checkpoint(id)
    }

    /// Returns the copies that currently count towards the global checkpoint.
    pub fn in_sync_allocation_ids(&self) -> Vec<AllocationId> {
        self.lock().in_sync_ids().cloned().collect()
    }

    /// Returns a copy of the latest membership view.
    pub fn membership(&self) -> MembershipView {
        self.lock().membership().clone()
    }

    /// Takes a consistent snapshot of the tracker.
    pub fn stats(&self) -> CheckpointStats {
        CheckpointStats::collect(&self.shard_id, &self.lock())
    }
}
