// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use crate::checkpoint::{SeqNo, UNASSIGNED_SEQ_NO};
use crate::errors::{Error, Result};
use crate::shard::ShardId;

/// Config contains the parameters to start a checkpoint tracker.
#[derive(Clone, Debug)]
pub struct Config {
    /// The shard the tracker computes the global checkpoint for.
    pub shard_id: ShardId,

    /// The global checkpoint the tracker starts from.
    ///
    /// Hosts that persist the global checkpoint as a recovery hint restore it here when
    /// the shard reopens. A fresh shard starts at `UNASSIGNED_SEQ_NO`.
    pub initial_global_checkpoint: SeqNo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_id: ShardId::new("", 0),
            initial_global_checkpoint: UNASSIGNED_SEQ_NO,
        }
    }
}

impl Config {
    /// Creates a new config for the given shard.
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            ..Self::default()
        }
    }

    /// Runs validations against the config.
    pub fn validate(&self) -> Result<()> {
        if self.initial_global_checkpoint < UNASSIGNED_SEQ_NO {
            return Err(Error::ConfigInvalid(format!(
                "initial global checkpoint {} is below the unassigned sentinel {}",
                self.initial_global_checkpoint, UNASSIGNED_SEQ_NO
            )));
        }

        Ok(())
    }
}
