// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use crate::checkpoint::{SeqNo, UNASSIGNED_SEQ_NO};
use crate::shard::AllocationId;

/// Looks up the local checkpoint a copy has acknowledged.
pub trait AckedIndexer {
    /// Returns the acknowledged checkpoint of `id`, or `None` if the copy is unknown.
    fn acked_index(&self, id: &AllocationId) -> Option<SeqNo>;
}

/// Returns the largest checkpoint acknowledged by every copy in `ids`.
///
/// Unlike a majority quorum, every listed copy has to hold the data, so a single lagging
/// copy pins the result. A copy without an acknowledgement counts as
/// `UNASSIGNED_SEQ_NO`. Returns `None` if `ids` is empty.
pub fn committed_index<'a, I>(ids: I, l: &impl AckedIndexer) -> Option<SeqNo>
where
    I: IntoIterator<Item = &'a AllocationId>,
{
    ids.into_iter()
        .map(|id| l.acked_index(id).unwrap_or(UNASSIGNED_SEQ_NO))
        .min()
}
