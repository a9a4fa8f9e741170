// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeSet;

use crate::shard::AllocationId;

/// Union is a helper for iterating over two sets of allocation ids without cloning.
///
/// Iteration follows allocation id order, and an id present in both sets is
/// yielded once.
#[derive(Clone, Copy, Debug)]
pub struct Union<'a> {
    first: &'a BTreeSet<AllocationId>,
    second: &'a BTreeSet<AllocationId>,
}

impl<'a> Union<'a> {
    /// Creates a union.
    pub fn new(
        first: &'a BTreeSet<AllocationId>,
        second: &'a BTreeSet<AllocationId>,
    ) -> Union<'a> {
        Union { first, second }
    }

    /// Creates an iterator over the union of the two sets.
    pub fn iter(&self) -> impl Iterator<Item = &'a AllocationId> {
        self.first.union(self.second)
    }
}
