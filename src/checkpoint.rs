// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::fmt::{self, Display, Formatter};

/// A sequence number assigned to an operation by the primary.
pub type SeqNo = i64;

/// Marks a checkpoint that has not been recorded yet, or a copy that is not tracked.
pub const UNASSIGNED_SEQ_NO: SeqNo = -2;

/// The local checkpoint of a copy that has persisted nothing yet.
pub const NO_OPS_PERFORMED: SeqNo = -1;

/// The global checkpoint of a shard.
///
/// The value can only move forward, through [`GlobalCheckpoint::advance_to`]. Nothing
/// else in the crate holds a mutable handle on the raw number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobalCheckpoint(SeqNo);

impl Default for GlobalCheckpoint {
    fn default() -> GlobalCheckpoint {
        GlobalCheckpoint(UNASSIGNED_SEQ_NO)
    }
}

impl GlobalCheckpoint {
    /// Creates a checkpoint seeded at `seq_no`.
    pub fn new(seq_no: SeqNo) -> GlobalCheckpoint {
        GlobalCheckpoint(seq_no)
    }

    /// Returns the current value.
    #[inline]
    pub fn get(self) -> SeqNo {
        self.0
    }

    /// Moves the checkpoint to `candidate` if it is strictly ahead of the current value.
    ///
    /// Returns true if the checkpoint moved.
    pub fn advance_to(&mut self, candidate: SeqNo) -> bool {
        if candidate <= self.0 {
            return false;
        }
        let previous = self.0;
        self.0 = candidate;
        debug_assert!(self.0 > previous, "global checkpoint went backwards");
        true
    }
}

impl Display for GlobalCheckpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            UNASSIGNED_SEQ_NO => write!(f, "unassigned"),
            v => write!(f, "{}", v),
        }
    }
}
