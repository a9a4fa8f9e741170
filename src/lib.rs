// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

/*!

## Creating a tracker

One tracker exists per shard. It is built on the primary copy when the shard is opened or
a copy is promoted, from a [`Config`] naming the shard:

```rust
use seqno_checkpoint::{default_logger, Config, GlobalCheckpointTracker, ShardId};

let config = Config::new(ShardId::new("orders", 0));
let tracker = GlobalCheckpointTracker::new(&config, &default_logger()).unwrap();
assert_eq!(tracker.get_checkpoint(), seqno_checkpoint::UNASSIGNED_SEQ_NO);
```

## Feeding the tracker

Three independent paths drive the tracker:

1. The coordinator publishes the authoritative replica set whenever the shard topology
   changes, through `update_allocation_ids_from_master`. Copies listed as `active` are
   tracked immediately; `initializing` copies are only tracked once promoted.
2. Peer recovery promotes a caught-up copy with `mark_allocation_id_in_sync`.
3. The write path reports every durably persisted sequence number per copy with
   `update_local_checkpoint`, then asks for a recomputation with
   `update_checkpoint_on_primary`.

```rust
use seqno_checkpoint::{
    default_logger, AllocationId, Config, GlobalCheckpointTracker, HashSet, ShardId,
};

let config = Config::new(ShardId::new("orders", 0));
let tracker = GlobalCheckpointTracker::new(&config, &default_logger()).unwrap();

let primary = AllocationId::new("primary");
let replica = AllocationId::new("replica");
let active: HashSet<_> = vec![primary.clone()].into_iter().collect();
let initializing: HashSet<_> = vec![replica.clone()].into_iter().collect();
tracker.update_allocation_ids_from_master(&active, &initializing);

tracker.update_local_checkpoint(&primary, 10);
tracker.mark_allocation_id_in_sync(&replica, 3);
assert!(tracker.update_checkpoint_on_primary());
assert_eq!(tracker.get_checkpoint(), 3);
```

## Reading the tracker

`get_checkpoint` is a lock-free read and is safe to call from log truncation or read
gating at any rate. It reflects the last completed recomputation.

*/

#![deny(clippy::all)]
#![deny(missing_docs)]
#![recursion_limit = "128"]

#[macro_use]
extern crate slog;

mod checkpoint;
mod confchange;
mod config;
mod errors;
mod global_checkpoint;
mod quorum;
mod shard;
mod stats;
mod tracker;
mod util;

pub use self::checkpoint::{GlobalCheckpoint, SeqNo, NO_OPS_PERFORMED, UNASSIGNED_SEQ_NO};
pub use self::config::Config;
pub use self::errors::{Error, Result};
pub use self::global_checkpoint::GlobalCheckpointTracker;
pub use self::quorum::AckedIndexer;
pub use self::shard::{AllocationId, ShardId};
pub use self::stats::{CheckpointStats, CopyRole, CopyStats};
pub use self::tracker::{MembershipView, Progress, ProgressMap, ProgressTracker};
pub use self::util::Union;

pub mod prelude {
    //! A "prelude" for crates using the `seqno-checkpoint` crate.
    //!
    //! This prelude is similar to the standard library's prelude in that you'll
    //! almost always want to import its entire contents, but unlike the standard
    //! library's prelude you'll have to do so manually:
    //!
    //! ```
    //! use seqno_checkpoint::prelude::*;
    //! ```
    //!
    //! The prelude may grow over time as additional items see ubiquitous use.

    pub use crate::checkpoint::{SeqNo, NO_OPS_PERFORMED, UNASSIGNED_SEQ_NO};
    pub use crate::config::Config;
    pub use crate::global_checkpoint::GlobalCheckpointTracker;
    pub use crate::shard::{AllocationId, ShardId};
}

/// The default logger used by tests and by hosts that do not bring their own drain.
///
/// Currently, this is a terminal drain filtered by `RUST_LOG`, built once and shared.
#[cfg(any(test, feature = "default-logger"))]
pub fn default_logger() -> slog::Logger {
    use slog::Drain;
    use std::sync::{Mutex, OnceLock};

    static LOGGER: OnceLock<slog::Logger> = OnceLock::new();

    let logger = LOGGER.get_or_init(|| {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::CompactFormat::new(decorator).build();
        let drain = slog_envlogger::new(drain);
        slog::Logger::root(Mutex::new(drain).fuse(), o!())
    });
    if let Some(case) = std::thread::current()
        .name()
        .and_then(|v| v.split(':').last())
    {
        logger.new(o!("case" => case.to_string()))
    } else {
        logger.new(o!())
    }
}

type DefaultHashBuilder = std::hash::BuildHasherDefault<fxhash::FxHasher>;
/// A hash set keyed with the fast, deterministic `FxHasher`. Membership snapshots from the
/// coordinator are passed in this form.
pub type HashSet<K> = std::collections::HashSet<K, DefaultHashBuilder>;
