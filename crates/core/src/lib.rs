//! Level-up estimator core data models.
//!
//! This crate defines the item snapshot consumed by the estimator, the
//! progression stage ladder, and the per-refresh annotation types produced
//! from it.

#![warn(missing_docs)]

// Core identities
mod id;

// Progression ladder
mod stage;

// Snapshot input
mod item;
mod snapshot;

// Computed output
mod date;
mod annotation;
mod diagnostic;

// Re-exports
pub use id::ItemId;
pub use stage::{Stage, StageDurationTable};
pub use item::{
    index_items, AssignmentState, Item, ItemClass, RawAssignment, RawItem, RawSubjectData,
};
pub use snapshot::RawSnapshot;
pub use date::EstimatedDate;
pub use annotation::Annotation;
pub use diagnostic::Diagnostic;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
