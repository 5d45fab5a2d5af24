//! Recoverable conditions raised while estimating a snapshot.

use serde::Serialize;

use crate::{ItemClass, ItemId, Time};

/// A condition the estimator absorbed instead of failing.
///
/// None of these abort a refresh; each is logged and kept on the annotation
/// set so debug output can list it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A prerequisite id is not part of the snapshot
    #[error("item {item}: prerequisite {prerequisite} is not among the snapshot's prerequisite items, skipped")]
    MissingPrerequisite {
        /// The dependent item
        item: ItemId,
        /// The id that could not be found
        prerequisite: ItemId,
    },

    /// An item's earliest start could not be derived
    #[error("item {item}: earliest start is undetermined ({reason})")]
    UndeterminedStart {
        /// The affected item
        item: ItemId,
        /// Why no date was available
        reason: &'static str,
    },

    /// A raw record could not be indexed or classified
    #[error("malformed item{}: {reason}", .id.map(|id| format!(" {id}")).unwrap_or_default())]
    MalformedItem {
        /// The record's id, when it had one
        id: Option<ItemId>,
        /// What was wrong with it
        reason: String,
    },

    /// Milestone prediction was asked for an empty population
    #[error("no {class} items in the snapshot, milestone is undetermined")]
    EmptyPopulation {
        /// The class that was empty
        class: ItemClass,
    },

    /// The refresh timer was re-armed while a fire was still pending
    #[error("refresh timer re-armed, pending fire at {replaced} canceled")]
    StaleTimer {
        /// The instant the canceled timer would have fired
        replaced: Time,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_item_message() {
        let with_id = Diagnostic::MalformedItem {
            id: Some(ItemId::new(3)),
            reason: "unsupported object type 'vocabulary'".to_string(),
        };
        assert_eq!(
            with_id.to_string(),
            "malformed item 3: unsupported object type 'vocabulary'"
        );

        let without_id = Diagnostic::MalformedItem {
            id: None,
            reason: "missing id".to_string(),
        };
        assert_eq!(without_id.to_string(), "malformed item: missing id");
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let diag = Diagnostic::MissingPrerequisite {
            item: ItemId::new(10),
            prerequisite: ItemId::new(2),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "missing_prerequisite");
        assert_eq!(json["prerequisite"], 2);
    }
}
