// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::cmp;
use std::collections::BTreeMap;

use crate::checkpoint::{SeqNo, UNASSIGNED_SEQ_NO};
use crate::quorum::AckedIndexer;
use crate::shard::AllocationId;

/// The progress of one tracked copy, as seen by the primary.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// The highest sequence number the copy has confirmed as durable, such that every
    /// operation at or below it is persisted on the copy.
    pub local_checkpoint: SeqNo,
}

impl Default for Progress {
    fn default() -> Progress {
        Progress::new(UNASSIGNED_SEQ_NO)
    }
}

impl Progress {
    /// Creates a new progress seeded at `local_checkpoint`.
    pub fn new(local_checkpoint: SeqNo) -> Self {
        Progress { local_checkpoint }
    }

    /// Returns false if the given checkpoint comes from an outdated report.
    /// Otherwise it updates the progress and returns true.
    ///
    /// Reports can be delivered late or twice, so the value only ever moves up.
    pub fn maybe_update(&mut self, n: SeqNo) -> bool {
        let need_update = self.local_checkpoint < n;
        self.local_checkpoint = cmp::max(self.local_checkpoint, n);
        need_update
    }

    /// Overwrites the checkpoint, as recovery does when it hands a copy over.
    pub fn reset(&mut self, local_checkpoint: SeqNo) {
        self.local_checkpoint = local_checkpoint;
    }
}

/// The progress of every tracked copy, ordered by allocation id.
pub type ProgressMap = BTreeMap<AllocationId, Progress>;

impl AckedIndexer for ProgressMap {
    #[inline]
    fn acked_index(&self, id: &AllocationId) -> Option<SeqNo> {
        self.get(id).map(|p| p.local_checkpoint)
    }
}
