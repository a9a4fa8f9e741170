// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};

use crate::checkpoint::{SeqNo, UNASSIGNED_SEQ_NO};
use crate::errors::Result;
use crate::shard::{AllocationId, ShardId};
use crate::tracker::ProgressTracker;

/// How a copy relates to the global checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyRole {
    /// A full quorum member.
    Active,
    /// An initializing copy that has been marked in sync.
    InSync,
    /// An initializing copy that does not count yet.
    Pending,
}

/// Checkpoint information about one copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyStats {
    /// The copy.
    pub allocation_id: AllocationId,
    /// Its membership role.
    pub role: CopyRole,
    /// Its local checkpoint, `UNASSIGNED_SEQ_NO` for pending copies.
    pub local_checkpoint: SeqNo,
}

/// A point-in-time snapshot of a tracker, for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointStats {
    /// The shard.
    pub shard_id: ShardId,
    /// The global checkpoint when the snapshot was taken.
    pub global_checkpoint: SeqNo,
    /// Every copy in the membership view, in allocation id order.
    pub copies: Vec<CopyStats>,
}

impl CheckpointStats {
    pub(crate) fn collect(shard_id: &ShardId, tracker: &ProgressTracker) -> CheckpointStats {
        let view = tracker.membership();
        let copies = view
            .ids()
            .iter()
            .map(|id| {
                let tracked = tracker.progress().contains_key(id);
                let role = if view.is_active(id) {
                    CopyRole::Active
                } else if tracked {
                    CopyRole::InSync
                } else {
                    CopyRole::Pending
                };
                CopyStats {
                    allocation_id: id.clone(),
                    role,
                    local_checkpoint: tracker.local_checkpoint(id),
                }
            })
            .collect();
        CheckpointStats {
            shard_id: shard_id.clone(),
            global_checkpoint: tracker.global_checkpoint(),
            copies,
        }
    }

    /// The lowest local checkpoint among copies that count, or `UNASSIGNED_SEQ_NO` if
    /// none does. The global checkpoint catches up to it on the next recomputation.
    pub fn min_in_sync_checkpoint(&self) -> SeqNo {
        self.copies
            .iter()
            .filter(|c| c.role != CopyRole::Pending)
            .map(|c| c.local_checkpoint)
            .min()
            .unwrap_or(UNASSIGNED_SEQ_NO)
    }

    /// Renders the snapshot as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
