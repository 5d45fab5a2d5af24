//! Snapshot annotation: prerequisite pass, then dependent pass.

use std::collections::BTreeMap;

use levelup_core::{Annotation, Diagnostic, EstimatedDate, Item, ItemClass, ItemId, Time};
use tracing::{debug, info, warn};

use crate::{DependencyResolver, Direction, MultiKeyOrder, StageProgressionEstimator};

/// The side table of annotations built from one snapshot.
///
/// Built atomically per refresh and replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    loaded_at: Time,
    annotations: BTreeMap<ItemId, Annotation>,
    diagnostics: Vec<Diagnostic>,
}

impl AnnotationSet {
    /// Snapshot load time every date was clamped against.
    pub fn loaded_at(&self) -> Time {
        self.loaded_at
    }

    /// Annotation of one item.
    pub fn get(&self, id: ItemId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// All annotations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    /// Number of annotated items.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether nothing was annotated.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Conditions absorbed while annotating.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Pair each item with its annotation, keeping the items' order.
    pub fn join<'a>(&'a self, items: &'a [Item]) -> Vec<AnnotatedItem<'a>> {
        items
            .iter()
            .filter_map(|item| {
                self.annotations
                    .get(&item.id)
                    .map(|annotation| AnnotatedItem { item, annotation })
            })
            .collect()
    }

    /// Pair items with annotations in listing order: soonest start first,
    /// then soonest completion, then id.
    pub fn listing<'a>(&'a self, items: &'a [Item]) -> Vec<AnnotatedItem<'a>> {
        let order = listing_order();
        let mut joined = self.join(items);
        joined.sort_by(|a, b| order.compare(a.annotation, b.annotation));
        joined
    }
}

fn listing_order() -> MultiKeyOrder<Annotation> {
    MultiKeyOrder::new()
        .then_by(|a: &Annotation| a.current_earliest_eligible_start, Direction::Ascending)
        .then_by(|a: &Annotation| a.predicted_completion, Direction::Ascending)
        .then_by(|a: &Annotation| a.id, Direction::Ascending)
}

/// An item viewed together with its annotation.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedItem<'a> {
    /// Source record
    pub item: &'a Item,
    /// Computed dates
    pub annotation: &'a Annotation,
}

impl AnnotatedItem<'_> {
    /// Item id.
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Earliest start, never before the load time.
    pub fn current_start(&self) -> EstimatedDate {
        self.annotation.current_earliest_eligible_start
    }

    /// Predicted milestone date.
    pub fn predicted_completion(&self) -> EstimatedDate {
        self.annotation.predicted_completion
    }

    /// Unlocked and not yet at the milestone.
    pub fn is_open(&self) -> bool {
        !self.item.is_locked() && !self.item.is_completed()
    }
}

/// Builds an [`AnnotationSet`] from a snapshot.
pub struct SnapshotAnnotator {
    estimator: StageProgressionEstimator,
    resolver: DependencyResolver,
}

impl SnapshotAnnotator {
    /// Create a new annotator.
    pub fn new() -> Self {
        Self {
            estimator: StageProgressionEstimator,
            resolver: DependencyResolver::new(),
        }
    }

    /// Annotate every item of the snapshot as of `now`.
    ///
    /// Prerequisite-type items are annotated first; dependent-type items then
    /// read their prerequisites' predicted completions from that first pass.
    pub fn annotate(&self, items: &[Item], now: Time) -> AnnotationSet {
        let mut diagnostics = Vec::new();

        let no_prerequisites = BTreeMap::new();
        let mut prerequisites = BTreeMap::new();
        for item in items.iter().filter(|i| i.class == ItemClass::Prerequisite) {
            let annotation = self.annotate_item(item, now, &no_prerequisites, &mut diagnostics);
            prerequisites.insert(item.id, annotation);
        }
        let prerequisite_count = prerequisites.len();

        let mut annotations = prerequisites.clone();
        for item in items.iter().filter(|i| i.class == ItemClass::Dependent) {
            let annotation = self.annotate_item(item, now, &prerequisites, &mut diagnostics);
            annotations.insert(item.id, annotation);
        }

        info!(
            "Annotated {} items ({} prerequisite, {} dependent) as of {}",
            annotations.len(),
            prerequisite_count,
            annotations.len() - prerequisite_count,
            now
        );

        AnnotationSet {
            loaded_at: now,
            annotations,
            diagnostics,
        }
    }

    fn annotate_item(
        &self,
        item: &Item,
        now: Time,
        prerequisites: &BTreeMap<ItemId, Annotation>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Annotation {
        let state = &item.assignment;
        let is_locked = item.is_locked();

        let earliest_eligible_start = if !is_locked {
            if state.is_started() {
                EstimatedDate::from(state.eligible_at)
            } else {
                EstimatedDate::from(state.unlocked_at)
            }
        } else {
            let resolution = self.resolver.resolve_earliest_start(item, prerequisites);
            diagnostics.extend(resolution.missing.iter().map(|prerequisite| {
                Diagnostic::MissingPrerequisite {
                    item: item.id,
                    prerequisite: *prerequisite,
                }
            }));
            resolution.earliest_start
        };

        if earliest_eligible_start.is_undetermined() && !state.is_completed() {
            let reason = if !is_locked {
                "started without a next review date"
            } else if item.prerequisite_ids.is_empty() {
                "locked without prerequisites"
            } else {
                "no prerequisite could be resolved"
            };
            let diagnostic = Diagnostic::UndeterminedStart {
                item: item.id,
                reason,
            };
            warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
        }

        let mut current_earliest_eligible_start = earliest_eligible_start.not_before(now);
        // Keeps predicted completion >= current start for completed items,
        // whose start may therefore lie before `now`.
        if let (Some(done), EstimatedDate::At(start)) =
            (state.completed_at, current_earliest_eligible_start)
        {
            current_earliest_eligible_start = EstimatedDate::At(start.min(done));
        }

        let predicted_completion = self.estimator.estimate(
            current_earliest_eligible_start,
            state.stage,
            state.completed_at,
        );

        debug!(
            "Item {} ({}): locked={} stage={} start={:?} completion={:?}",
            item.id,
            item.class,
            is_locked,
            state.stage.value(),
            current_earliest_eligible_start,
            predicted_completion
        );

        Annotation {
            id: item.id,
            class: item.class,
            is_locked,
            earliest_eligible_start,
            current_earliest_eligible_start,
            predicted_completion,
        }
    }
}

impl Default for SnapshotAnnotator {
    fn default() -> Self {
        Self::new()
    }
}
