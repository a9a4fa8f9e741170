// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifies the shard a tracker belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId {
    index: String,
    shard: u32,
}

impl ShardId {
    /// Creates the id of shard number `shard` of `index`.
    pub fn new(index: impl Into<String>, shard: u32) -> ShardId {
        ShardId {
            index: index.into(),
            shard,
        }
    }

    /// The name of the index the shard belongs to.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The shard number within the index.
    pub fn shard(&self) -> u32 {
        self.shard
    }
}

impl Display for ShardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.index, self.shard)
    }
}

/// The identity of one physical copy of a shard.
///
/// A relocated or re-created copy gets a fresh id, so an id never comes back once the
/// coordinator has dropped it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(String);

impl AllocationId {
    /// Wraps `id` as an allocation id.
    pub fn new(id: impl Into<String>) -> AllocationId {
        AllocationId(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AllocationId {
    fn from(id: &str) -> AllocationId {
        AllocationId::new(id)
    }
}

impl From<String> for AllocationId {
    fn from(id: String) -> AllocationId {
        AllocationId(id)
    }
}

impl Display for AllocationId {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
