//! Per-refresh estimation context.

use levelup_core::{index_items, Diagnostic, Item, ItemClass, RawSnapshot, Time};
use levelup_progress::{
    render_debug_dump, AggregateMilestonePredictor, AnnotatedItem, AnnotationSet, DateFormatter,
    MilestonePrediction, SnapshotAnnotator,
};
use tracing::{debug, info};

use crate::summary::{ActionHint, EstimateSummary, StudySet};
use crate::SoonestActionableSetSelector;

/// Everything derived from one snapshot load.
///
/// Built once per refresh from the freshly fetched records and read by every
/// consumer until the next refresh replaces it.
pub struct EstimationContext {
    items: Vec<Item>,
    annotations: AnnotationSet,
    milestone: MilestonePrediction,
    diagnostics: Vec<Diagnostic>,
    selector: SoonestActionableSetSelector,
}

impl EstimationContext {
    /// Index, annotate and predict over `raw` as of `now`.
    ///
    /// Records the source already rejected are reported ahead of the ones
    /// indexing drops.
    pub fn build(raw: impl Into<RawSnapshot>, now: Time, threshold: f64) -> Self {
        let RawSnapshot { items, rejected } = raw.into();
        let (items, indexing) = index_items(items);
        let mut diagnostics = rejected;
        diagnostics.extend(indexing);
        Self::from_items(items, now, threshold, diagnostics)
    }

    /// Annotate and predict over already classified items, keeping
    /// `diagnostics` raised while classifying them.
    pub fn from_items(
        items: Vec<Item>,
        now: Time,
        threshold: f64,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let annotations = SnapshotAnnotator::new().annotate(&items, now);
        diagnostics.extend(annotations.diagnostics().iter().cloned());

        let dependents: Vec<_> = annotations
            .join(&items)
            .into_iter()
            .filter(|e| e.item.class == ItemClass::Dependent)
            .map(|e| *e.annotation)
            .collect();
        let milestone = AggregateMilestonePredictor::new(threshold).predict(&dependents);
        if milestone.population == 0 {
            let diagnostic = Diagnostic::EmptyPopulation {
                class: ItemClass::Dependent,
            };
            info!("{}", diagnostic);
            diagnostics.push(diagnostic);
        }
        debug!(
            "Milestone: rank {} of {} -> {:?}",
            milestone.rank, milestone.population, milestone.date
        );

        Self {
            items,
            annotations,
            milestone,
            diagnostics,
            selector: SoonestActionableSetSelector::new(),
        }
    }

    /// Snapshot load time.
    pub fn now(&self) -> Time {
        self.annotations.loaded_at()
    }

    /// Classified items of the snapshot.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The annotation side table.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Aggregate milestone prediction.
    pub fn milestone(&self) -> MilestonePrediction {
        self.milestone
    }

    /// Every diagnostic from indexing, annotation and prediction.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Items with annotations, in listing order.
    pub fn listing(&self) -> Vec<AnnotatedItem<'_>> {
        self.annotations.listing(&self.items)
    }

    /// Items studiable now, or else the soonest ones.
    pub fn soonest_set(&self) -> Vec<AnnotatedItem<'_>> {
        self.selector.next_study_set(&self.listing(), self.now())
    }

    /// The set that follows [`Self::soonest_set`] when that set is
    /// actionable now; empty while the soonest set is still in the future.
    pub fn look_ahead(&self) -> Vec<AnnotatedItem<'_>> {
        let listing = self.listing();
        let soonest = self.selector.next_study_set(&listing, self.now());
        self.look_ahead_after(&listing, &soonest)
    }

    fn look_ahead_after<'a>(
        &self,
        listing: &[AnnotatedItem<'a>],
        soonest: &[AnnotatedItem<'a>],
    ) -> Vec<AnnotatedItem<'a>> {
        let now = self.now();
        match soonest.first() {
            Some(first) if first.current_start().is_due(now) => {
                self.selector.look_ahead(listing, now, soonest)
            }
            _ => Vec::new(),
        }
    }

    /// Open items actionable right now.
    pub fn actionable_now(&self) -> Vec<AnnotatedItem<'_>> {
        self.selector.actionable_and_unpassed(&self.listing(), self.now())
    }

    /// Soonest future instant at which the study sets change.
    pub fn next_state_change(&self) -> Option<Time> {
        self.selector.next_state_change(&self.listing(), self.now())
    }

    /// Output surfaces for a UI.
    pub fn summary(&self) -> EstimateSummary {
        let listing = self.listing();
        let now = self.now();
        let soonest = self.selector.next_study_set(&listing, now);
        let look_ahead = self.look_ahead_after(&listing, &soonest);
        let actionable = self.selector.actionable_and_unpassed(&listing, now);

        EstimateSummary {
            loaded_at: now,
            milestone: self.milestone,
            soonest_set: StudySet::from_items(&soonest),
            look_ahead: StudySet::from_items(&look_ahead),
            actionable_now: ActionHint::from_actionable(&actionable),
            next_refresh_at: self.selector.next_state_change(&listing, now),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Tabular listing of every item not yet at the milestone.
    pub fn debug_dump(&self, formatter: &DateFormatter, detailed: bool) -> String {
        render_debug_dump(&self.listing(), &self.diagnostics, formatter, detailed)
    }
}
