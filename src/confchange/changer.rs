// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

use crate::shard::AllocationId;
use crate::tracker::{MembershipView, ProgressMap, ProgressTracker};
use crate::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Change log for progress map.
pub enum MapChangeType {
    /// Start tracking the copy at `UNASSIGNED_SEQ_NO`.
    Add,
    /// Stop tracking the copy and drop its progress.
    Remove,
}

/// Changes made by `Changer`.
pub type MapChange = Vec<(AllocationId, MapChangeType)>;

#[derive(Debug)]
/// A map that stores updates instead of apply them directly.
pub struct IncrChangeMap<'a> {
    changes: MapChange,
    base: &'a ProgressMap,
}

impl IncrChangeMap<'_> {
    /// Consumes the map, returning the recorded changes in order.
    pub fn into_changes(self) -> MapChange {
        self.changes
    }

    fn contains(&self, id: &AllocationId) -> bool {
        match self.changes.iter().rfind(|(i, _)| i == id) {
            Some((_, MapChangeType::Remove)) => false,
            Some((_, MapChangeType::Add)) => true,
            None => self.base.contains_key(id),
        }
    }
}

/// Changer reconciles the tracked copies with a membership view published by the
/// coordinator. It computes the changes without touching the tracker, so the caller
/// can swap the view and apply the changes in one step.
pub struct Changer<'a> {
    tracker: &'a ProgressTracker,
}

impl Changer<'_> {
    /// Creates a changer.
    pub fn new(tracker: &ProgressTracker) -> Changer {
        Changer { tracker }
    }

    /// Builds the view for the given sets and the progress changes that go with it.
    ///
    /// Tracked copies missing from both sets are removed. Active copies that are not
    /// tracked yet are added. Initializing copies are left alone: they are only tracked
    /// once recovery marks them in sync, and a copy already marked keeps its progress.
    pub fn reconcile(
        &self,
        active: &HashSet<AllocationId>,
        initializing: &HashSet<AllocationId>,
    ) -> (MembershipView, MapChange) {
        let view = MembershipView::new(active, initializing);
        let mut prs = IncrChangeMap {
            changes: vec![],
            base: self.tracker.progress(),
        };

        for id in prs.base.keys() {
            if !view.contains(id) {
                prs.changes.push((id.clone(), MapChangeType::Remove));
            }
        }
        for id in view.active() {
            if !prs.contains(id) {
                prs.changes.push((id.clone(), MapChangeType::Add));
            }
        }

        if cfg!(debug_assertions) {
            if let Err(e) = check_invariants(&view, &prs) {
                panic!("reconciled membership is inconsistent: {}", e);
            }
        }
        (view, prs.into_changes())
    }
}

/// Makes sure that the view and progress are compatible with each other.
fn check_invariants(view: &MembershipView, prs: &IncrChangeMap) -> Result<(), String> {
    for id in view.active() {
        if !prs.contains(id) {
            return Err(format!("no progress for active copy {}", id));
        }
    }
    let touched = prs.base.keys().chain(prs.changes.iter().map(|(id, _)| id));
    for id in touched {
        if prs.contains(id) && !view.contains(id) {
            return Err(format!("progress for unknown copy {}", id));
        }
    }
    Ok(())
}
