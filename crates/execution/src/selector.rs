//! Soonest and currently actionable study sets.

use std::collections::HashSet;

use levelup_core::{ItemId, Time};
use levelup_progress::AnnotatedItem;

/// Selects the items that can be studied now or soonest.
///
/// Only open items (unlocked, not yet at the milestone) with a determined
/// start are considered.
pub struct SoonestActionableSetSelector;

impl SoonestActionableSetSelector {
    /// Create a new selector.
    pub fn new() -> Self {
        Self
    }

    /// The next study set.
    ///
    /// If any open item is actionable now, the set is exactly those items.
    /// Otherwise it is every item sharing the minimal future start (all of
    /// them, not just the first). The two groups are never mixed. Input order
    /// is preserved.
    pub fn next_study_set<'a>(
        &self,
        items: &[AnnotatedItem<'a>],
        now: Time,
    ) -> Vec<AnnotatedItem<'a>> {
        let candidates = || {
            items
                .iter()
                .copied()
                .filter(|e| e.is_open() && !e.current_start().is_undetermined())
        };

        let due: Vec<_> = candidates().filter(|e| e.current_start().is_due(now)).collect();
        if !due.is_empty() {
            return due;
        }

        let Some(soonest) = candidates().map(|e| e.current_start()).min() else {
            return Vec::new();
        };
        candidates().filter(|e| e.current_start() == soonest).collect()
    }

    /// The study set following `current`: the next study set over the items
    /// not already in `current`.
    pub fn look_ahead<'a>(
        &self,
        items: &[AnnotatedItem<'a>],
        now: Time,
        current: &[AnnotatedItem<'_>],
    ) -> Vec<AnnotatedItem<'a>> {
        let taken: HashSet<ItemId> = current.iter().map(|e| e.id()).collect();
        let rest: Vec<_> = items
            .iter()
            .copied()
            .filter(|e| !taken.contains(&e.id()))
            .collect();
        self.next_study_set(&rest, now)
    }

    /// Open items that are actionable right now.
    pub fn actionable_and_unpassed<'a>(
        &self,
        items: &[AnnotatedItem<'a>],
        now: Time,
    ) -> Vec<AnnotatedItem<'a>> {
        items
            .iter()
            .copied()
            .filter(|e| e.is_open() && e.current_start().is_due(now))
            .collect()
    }

    /// Soonest instant after `now` at which an open item becomes actionable.
    pub fn next_state_change(&self, items: &[AnnotatedItem<'_>], now: Time) -> Option<Time> {
        items
            .iter()
            .filter(|e| e.is_open())
            .filter_map(|e| e.current_start().at())
            .filter(|t| *t > now)
            .min()
    }
}

impl Default for SoonestActionableSetSelector {
    fn default() -> Self {
        Self::new()
    }
}
