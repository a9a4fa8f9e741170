// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeSet;

use getset::Getters;

use crate::shard::AllocationId;
use crate::util::Union;
use crate::HashSet;

/// The replica set of a shard, as last published by the coordinator.
#[derive(Clone, Debug, Default, PartialEq, Getters)]
pub struct MembershipView {
    /// Copies that are fully caught up and part of the durability quorum.
    #[get = "pub"]
    pub(crate) active: BTreeSet<AllocationId>,
    /// Copies that exist but only count once recovery marks them in sync.
    #[get = "pub"]
    pub(crate) initializing: BTreeSet<AllocationId>,
}

impl MembershipView {
    /// Creates a view from the coordinator's sets.
    ///
    /// The coordinator keeps the two sets disjoint. If an id shows up in both anyway, it
    /// is treated as active.
    pub fn new(active: &HashSet<AllocationId>, initializing: &HashSet<AllocationId>) -> Self {
        let active: BTreeSet<_> = active.iter().cloned().collect();
        let initializing = initializing
            .iter()
            .filter(|id| !active.contains(*id))
            .cloned()
            .collect();
        MembershipView {
            active,
            initializing,
        }
    }

    /// Returns an iterator over every known copy without cloning.
    pub fn ids(&self) -> Union<'_> {
        Union::new(&self.active, &self.initializing)
    }

    /// Checks if the copy is known to the coordinator at all.
    #[inline]
    pub fn contains(&self, id: &AllocationId) -> bool {
        self.active.contains(id) || self.initializing.contains(id)
    }

    /// Checks if the copy is still recovering.
    #[inline]
    pub fn is_initializing(&self, id: &AllocationId) -> bool {
        self.initializing.contains(id)
    }

    /// Checks if the copy is a full quorum member.
    #[inline]
    pub fn is_active(&self, id: &AllocationId) -> bool {
        self.active.contains(id)
    }
}
