//! Per-refresh computed dates for a single item.

use serde::Serialize;

use crate::{EstimatedDate, ItemClass, ItemId};

/// Dates derived for one item from one snapshot.
///
/// Annotations live in a side table keyed by item id and are rebuilt
/// wholesale on every refresh; the source `Item` is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// The annotated item
    pub id: ItemId,

    /// Class of the annotated item
    pub class: ItemClass,

    /// True iff the item has no unlock timestamp
    pub is_locked: bool,

    /// Earliest moment the item could next be studied
    pub earliest_eligible_start: EstimatedDate,

    /// `earliest_eligible_start`, never earlier than the snapshot load time
    pub current_earliest_eligible_start: EstimatedDate,

    /// Predicted moment the item reaches the milestone stage
    pub predicted_completion: EstimatedDate,
}

impl Annotation {
    /// Whether any of the derived dates is undetermined.
    pub fn is_undetermined(&self) -> bool {
        self.current_earliest_eligible_start.is_undetermined()
            || self.predicted_completion.is_undetermined()
    }
}
