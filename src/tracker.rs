// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

mod membership;
mod progress;

pub use self::membership::MembershipView;
pub use self::progress::{Progress, ProgressMap};

use getset::Getters;
use slog::Logger;

use crate::checkpoint::{GlobalCheckpoint, SeqNo, UNASSIGNED_SEQ_NO};
use crate::confchange::{Changer, MapChange, MapChangeType};
use crate::quorum;
use crate::shard::AllocationId;
use crate::HashSet;

/// `ProgressTracker` tracks the membership view published by the coordinator and the
/// local checkpoint of every copy that counts towards the global checkpoint.
///
/// A copy is tracked if it is active, or if it is initializing and recovery has marked
/// it in sync. The global checkpoint is the lowest local checkpoint among tracked copies
/// and never goes backwards.
///
/// The tracker itself is not synchronized; see `GlobalCheckpointTracker` for the shared
/// entry point.
#[derive(Clone, Getters)]
pub struct ProgressTracker {
    progress: ProgressMap,

    /// The latest membership view.
    #[get = "pub"]
    membership: MembershipView,

    global_checkpoint: GlobalCheckpoint,

    pub(crate) logger: Logger,
}

impl ProgressTracker {
    /// Creates a tracker with no copies, starting from `initial_global_checkpoint`.
    pub fn new(initial_global_checkpoint: SeqNo, logger: Logger) -> Self {
        ProgressTracker {
            progress: ProgressMap::new(),
            membership: MembershipView::default(),
            global_checkpoint: GlobalCheckpoint::new(initial_global_checkpoint),
            logger,
        }
    }

    /// Returns the progress of every tracked copy.
    #[inline]
    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    /// Returns the current global checkpoint.
    #[inline]
    pub fn global_checkpoint(&self) -> SeqNo {
        self.global_checkpoint.get()
    }

    /// Returns the local checkpoint of a tracked copy, or `UNASSIGNED_SEQ_NO` if the copy
    /// is not tracked.
    pub fn local_checkpoint(&self, id: &AllocationId) -> SeqNo {
        self.progress
            .get(id)
            .map_or(UNASSIGNED_SEQ_NO, |p| p.local_checkpoint)
    }

    /// Returns the tracked copies in allocation id order.
    pub fn in_sync_ids(&self) -> impl Iterator<Item = &AllocationId> {
        self.progress.keys()
    }

    /// Replaces the membership view with the coordinator's latest sets.
    ///
    /// Tracked copies missing from both sets lose their progress. Active copies that
    /// are not tracked yet start at `UNASSIGNED_SEQ_NO` and hold back the global
    /// checkpoint until they report. Initializing copies are not tracked until they are
    /// marked in sync.
    pub fn update_allocation_ids_from_master(
        &mut self,
        active: &HashSet<AllocationId>,
        initializing: &HashSet<AllocationId>,
    ) {
        let (view, changes) = Changer::new(self).reconcile(active, initializing);
        self.apply_conf(view, &changes);
    }

    /// Swaps in the view and applies the progress changes computed for it.
    pub(crate) fn apply_conf(&mut self, view: MembershipView, changes: &MapChange) {
        self.membership = view;
        for (id, change_type) in changes {
            match change_type {
                MapChangeType::Add => {
                    debug!(self.logger, "tracking active copy"; "allocation_id" => %id);
                    self.progress.insert(id.clone(), Progress::default());
                }
                MapChangeType::Remove => {
                    debug!(
                        self.logger,
                        "dropping copy no longer validated by master";
                        "allocation_id" => %id,
                        "local_checkpoint" => self.local_checkpoint(id),
                    );
                    self.progress.remove(id);
                }
            }
        }
    }

    /// Starts tracking an initializing copy that recovery has brought in sync, seeding
    /// its local checkpoint at `local_checkpoint`.
    ///
    /// Ignored if the copy is not initializing in the latest view, which happens when
    /// the view moved on while recovery was running.
    pub fn mark_allocation_id_in_sync(&mut self, id: &AllocationId, local_checkpoint: SeqNo) {
        if !self.membership.is_initializing(id) {
            trace!(
                self.logger,
                "ignoring in-sync mark for copy that is not initializing";
                "allocation_id" => %id,
                "local_checkpoint" => local_checkpoint,
            );
            return;
        }
        debug!(
            self.logger,
            "marking copy in sync";
            "allocation_id" => %id,
            "local_checkpoint" => local_checkpoint,
        );
        self.progress
            .entry(id.clone())
            .or_default()
            .reset(local_checkpoint);
    }

    /// Records a local checkpoint reported by a copy. The checkpoint of a copy never
    /// goes backwards, so late or duplicate reports are harmless.
    ///
    /// Reports from copies that are not tracked are ignored.
    pub fn update_local_checkpoint(&mut self, id: &AllocationId, local_checkpoint: SeqNo) {
        match self.progress.get_mut(id) {
            Some(pr) => {
                if pr.maybe_update(local_checkpoint) {
                    trace!(
                        self.logger,
                        "updated local checkpoint";
                        "allocation_id" => %id,
                        "local_checkpoint" => local_checkpoint,
                    );
                }
            }
            None => trace!(
                self.logger,
                "ignoring local checkpoint from untracked copy";
                "allocation_id" => %id,
                "local_checkpoint" => local_checkpoint,
            ),
        }
    }

    /// Recomputes the global checkpoint from the tracked copies.
    ///
    /// Returns true if the global checkpoint moved forward. Nothing changes if no copy
    /// is tracked or the lowest local checkpoint is not ahead of the current value.
    pub fn update_checkpoint_on_primary(&mut self) -> bool {
        let candidate = match quorum::committed_index(self.progress.keys(), &self.progress) {
            Some(candidate) => candidate,
            None => return false,
        };
        let previous = self.global_checkpoint;
        if !self.global_checkpoint.advance_to(candidate) {
            return false;
        }
        debug!(
            self.logger,
            "global checkpoint advanced";
            "from" => %previous,
            "to" => %self.global_checkpoint,
        );
        true
    }

    /// Adopts a global checkpoint computed by the primary, as a replica does when the
    /// primary piggybacks it on replication requests.
    ///
    /// Returns true if the checkpoint moved forward. Values at or below the current one
    /// are ignored. A tracker that tracks copies is a primary and computes its own
    /// checkpoint, so it ignores every value.
    pub fn update_checkpoint_on_replica(&mut self, global_checkpoint: SeqNo) -> bool {
        if !self.progress.is_empty() {
            trace!(
                self.logger,
                "ignoring global checkpoint from primary while tracking copies";
                "received" => global_checkpoint,
                "tracked" => self.progress.len(),
            );
            return false;
        }
        let previous = self.global_checkpoint;
        if !self.global_checkpoint.advance_to(global_checkpoint) {
            trace!(
                self.logger,
                "ignoring global checkpoint from primary";
                "current" => %previous,
                "received" => global_checkpoint,
            );
            return false;
        }
        debug!(
            self.logger,
            "global checkpoint updated from primary";
            "from" => %previous,
            "to" => %self.global_checkpoint,
        );
        true
    }
}
