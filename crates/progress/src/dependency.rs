//! One-hop dependency resolution for locked items.

use std::collections::BTreeMap;

use levelup_core::{Annotation, EstimatedDate, Item, ItemId};
use tracing::debug;

/// Result of resolving a locked item's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Latest predicted completion among the prerequisites that were found,
    /// `Undetermined` when none were
    pub earliest_start: EstimatedDate,
    /// Prerequisite ids that were not among the annotated prerequisites
    pub missing: Vec<ItemId>,
}

impl Resolution {
    /// Whether no prerequisite date could be used.
    pub fn is_unresolved(&self) -> bool {
        self.earliest_start.is_undetermined()
    }
}

/// Resolves a locked item's earliest start from its prerequisites.
pub struct DependencyResolver;

impl DependencyResolver {
    /// Create a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Earliest start of `item` given already-annotated prerequisites.
    ///
    /// The item can start once its slowest prerequisite reaches the
    /// milestone, so the result is the maximum predicted completion over the
    /// prerequisites that are present. Missing ids are skipped and reported,
    /// never replaced by a made-up date.
    pub fn resolve_earliest_start(
        &self,
        item: &Item,
        prerequisites: &BTreeMap<ItemId, Annotation>,
    ) -> Resolution {
        let mut earliest_start = EstimatedDate::Undetermined;
        let mut missing = Vec::new();

        for id in &item.prerequisite_ids {
            match prerequisites.get(id) {
                Some(annotation) => {
                    earliest_start = earliest_start.max(annotation.predicted_completion);
                }
                None => missing.push(*id),
            }
        }

        if !missing.is_empty() {
            debug!("Item {}: {} prerequisite(s) not found: {:?}", item.id, missing.len(), missing);
        }

        Resolution {
            earliest_start,
            missing,
        }
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use levelup_core::{ItemClass, Time};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn prerequisite(id: u64, predicted: EstimatedDate) -> (ItemId, Annotation) {
        let id = ItemId::new(id);
        (
            id,
            Annotation {
                id,
                class: ItemClass::Prerequisite,
                is_locked: false,
                earliest_eligible_start: EstimatedDate::At(t0()),
                current_earliest_eligible_start: EstimatedDate::At(t0()),
                predicted_completion: predicted,
            },
        )
    }

    #[test]
    fn test_takes_latest_prerequisite() {
        let annotations: BTreeMap<_, _> = [
            prerequisite(1, EstimatedDate::At(t0() + Duration::hours(70))),
            prerequisite(2, EstimatedDate::At(t0() + Duration::hours(82))),
        ]
        .into_iter()
        .collect();
        let item = Item::new(ItemId::new(10), ItemClass::Dependent)
            .with_prerequisites([ItemId::new(1), ItemId::new(2)]);

        let resolution = DependencyResolver::new().resolve_earliest_start(&item, &annotations);
        assert_eq!(resolution.earliest_start, EstimatedDate::At(t0() + Duration::hours(82)));
        assert!(resolution.missing.is_empty());
    }

    #[test]
    fn test_skips_missing_prerequisites() {
        let annotations: BTreeMap<_, _> =
            [prerequisite(1, EstimatedDate::At(t0() + Duration::hours(70)))]
                .into_iter()
                .collect();
        let item = Item::new(ItemId::new(10), ItemClass::Dependent)
            .with_prerequisites([ItemId::new(1), ItemId::new(99)]);

        let resolution = DependencyResolver::new().resolve_earliest_start(&item, &annotations);
        assert_eq!(resolution.earliest_start, EstimatedDate::At(t0() + Duration::hours(70)));
        assert_eq!(resolution.missing, vec![ItemId::new(99)]);
    }

    #[test]
    fn test_nothing_resolved_is_undetermined() {
        let item = Item::new(ItemId::new(10), ItemClass::Dependent)
            .with_prerequisites([ItemId::new(99)]);

        let resolution = DependencyResolver::new().resolve_earliest_start(&item, &BTreeMap::new());
        assert!(resolution.is_unresolved());
        assert_eq!(resolution.missing, vec![ItemId::new(99)]);

        let lone = Item::new(ItemId::new(11), ItemClass::Prerequisite);
        let resolution = DependencyResolver::new().resolve_earliest_start(&lone, &BTreeMap::new());
        assert!(resolution.is_unresolved());
        assert!(resolution.missing.is_empty());
    }

    #[test]
    fn test_undetermined_prerequisite_does_not_win() {
        let annotations: BTreeMap<_, _> = [
            prerequisite(1, EstimatedDate::Undetermined),
            prerequisite(2, EstimatedDate::At(t0())),
        ]
        .into_iter()
        .collect();
        let item = Item::new(ItemId::new(10), ItemClass::Dependent)
            .with_prerequisites([ItemId::new(1), ItemId::new(2)]);

        let resolution = DependencyResolver::new().resolve_earliest_start(&item, &annotations);
        assert_eq!(resolution.earliest_start, EstimatedDate::At(t0()));
    }
}
