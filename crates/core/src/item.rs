//! Snapshot items and the raw records they are classified from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Diagnostic, ItemId, Stage, Time};

/// The two progression classes the estimator models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// No dependencies, gated only by its own assignment (radicals)
    Prerequisite,
    /// Unlocked once its prerequisites reach the milestone (kanji)
    Dependent,
}

impl ItemClass {
    /// Classify an upstream `object` type.
    pub fn from_object(object: &str) -> Option<Self> {
        match object {
            "radical" => Some(Self::Prerequisite),
            "kanji" => Some(Self::Dependent),
            _ => None,
        }
    }

    /// Upstream `object` type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prerequisite => "radical",
            Self::Dependent => "kanji",
        }
    }

    /// Name used when counting `count` items of this class.
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (Self::Prerequisite, 1) => "radical",
            (Self::Prerequisite, _) => "radicals",
            // kanji is its own plural
            (Self::Dependent, _) => "kanji",
        }
    }
}

impl std::fmt::Display for ItemClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment progress of one item, as of the last fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentState {
    /// When the item unlocked; absent means locked
    pub unlocked_at: Option<Time>,
    /// When the first lesson was taken
    pub started_at: Option<Time>,
    /// When the item is next available for review
    pub eligible_at: Option<Time>,
    /// When the item reached the milestone stage
    pub completed_at: Option<Time>,
    /// Current stage
    pub stage: Stage,
}

impl AssignmentState {
    /// A locked assignment at the lesson stage.
    pub fn locked() -> Self {
        Self::default()
    }

    /// An unlocked assignment whose lesson has not been taken.
    pub fn unlocked(at: Time) -> Self {
        Self {
            unlocked_at: Some(at),
            ..Self::default()
        }
    }

    /// Mark the lesson as taken, next review at `eligible_at`.
    pub fn started(mut self, at: Time, eligible_at: Time) -> Self {
        self.started_at = Some(at);
        self.eligible_at = Some(eligible_at);
        self
    }

    /// Mark the milestone as reached at `at`.
    pub fn completed(mut self, at: Time) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Set the current stage.
    pub fn at_stage(mut self, stage: impl Into<Stage>) -> Self {
        self.stage = stage.into();
        self
    }

    /// True iff there is no unlock timestamp.
    pub fn is_locked(&self) -> bool {
        self.unlocked_at.is_none()
    }

    /// True once the lesson has been taken.
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// True once the milestone has been reached.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// A classified snapshot item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,

    /// Progression class
    pub class: ItemClass,

    /// Items this one depends on (always empty for prerequisite-type items)
    pub prerequisite_ids: Vec<ItemId>,

    /// Display name
    pub name: String,

    /// Reference page
    pub document_url: Option<String>,

    /// Assignment progress
    pub assignment: AssignmentState,
}

impl Item {
    /// Create a locked item with no prerequisites.
    pub fn new(id: impl Into<ItemId>, class: ItemClass) -> Self {
        let id = id.into();
        Self {
            id,
            class,
            prerequisite_ids: Vec::new(),
            name: id.to_string(),
            document_url: None,
            assignment: AssignmentState::locked(),
        }
    }

    /// Set prerequisites.
    pub fn with_prerequisites(mut self, ids: impl IntoIterator<Item = impl Into<ItemId>>) -> Self {
        self.prerequisite_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the assignment state.
    pub fn with_assignment(mut self, assignment: AssignmentState) -> Self {
        self.assignment = assignment;
        self
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// True iff the item has no unlock timestamp.
    pub fn is_locked(&self) -> bool {
        self.assignment.is_locked()
    }

    /// True once the item reached the milestone.
    pub fn is_completed(&self) -> bool {
        self.assignment.is_completed()
    }
}

/// Subject fields of a raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSubjectData {
    /// Glyphs, absent for image-only subjects
    pub characters: Option<String>,
    /// Slug name
    pub slug: Option<String>,
    /// Reference page
    pub document_url: Option<String>,
    /// Component subjects
    pub component_subject_ids: Vec<u64>,
}

/// Assignment fields of a raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAssignment {
    /// Unlock time
    pub unlocked_at: Option<Time>,
    /// Lesson time
    pub started_at: Option<Time>,
    /// Next review time
    pub available_at: Option<Time>,
    /// Milestone time
    pub passed_at: Option<Time>,
    /// Stage number
    pub srs_stage: Option<u8>,
}

impl From<RawAssignment> for AssignmentState {
    fn from(raw: RawAssignment) -> Self {
        Self {
            unlocked_at: raw.unlocked_at,
            started_at: raw.started_at,
            eligible_at: raw.available_at,
            completed_at: raw.passed_at,
            stage: Stage::new(raw.srs_stage.unwrap_or(0)),
        }
    }
}

/// A record as delivered by the fetch collaborator.
///
/// Every field is optional so that a record missing its id or type still
/// decodes and is reported by [`index_items`]. Records whose fields have the
/// wrong type are rejected earlier, one by one, by
/// [`RawSnapshot::decode`](crate::RawSnapshot::decode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawItem {
    /// Subject id
    pub id: Option<u64>,
    /// Subject type
    pub object: Option<String>,
    /// Subject fields
    pub data: RawSubjectData,
    /// Assignment, absent while locked
    pub assignments: Option<RawAssignment>,
}

impl TryFrom<RawItem> for Item {
    type Error = Diagnostic;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let id = raw.id.map(ItemId::new).ok_or_else(|| Diagnostic::MalformedItem {
            id: None,
            reason: "missing id".to_string(),
        })?;

        let object = raw.object.ok_or_else(|| Diagnostic::MalformedItem {
            id: Some(id),
            reason: "missing object type".to_string(),
        })?;

        let class = ItemClass::from_object(&object).ok_or_else(|| Diagnostic::MalformedItem {
            id: Some(id),
            reason: format!("unsupported object type '{object}'"),
        })?;

        let prerequisite_ids = match class {
            ItemClass::Prerequisite => Vec::new(),
            ItemClass::Dependent => raw
                .data
                .component_subject_ids
                .into_iter()
                .map(ItemId::new)
                .collect(),
        };

        let name = raw
            .data
            .characters
            .or(raw.data.slug)
            .unwrap_or_else(|| id.to_string());

        Ok(Self {
            id,
            class,
            prerequisite_ids,
            name,
            document_url: raw.data.document_url,
            assignment: raw.assignments.map(AssignmentState::from).unwrap_or_default(),
        })
    }
}

/// Classify raw records into items.
///
/// Records that cannot be indexed (missing id, missing or unsupported type,
/// duplicate id) are left out and reported; the rest of the snapshot is kept
/// in its original order.
pub fn index_items(raw: impl IntoIterator<Item = RawItem>) -> (Vec<Item>, Vec<Diagnostic>) {
    let mut items = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();

    for record in raw {
        match Item::try_from(record) {
            Ok(item) if !seen.insert(item.id) => {
                let diagnostic = Diagnostic::MalformedItem {
                    id: Some(item.id),
                    reason: "duplicate id".to_string(),
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
            Ok(item) => items.push(item),
            Err(diagnostic) => {
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }
    }

    (items, diagnostics)
}
