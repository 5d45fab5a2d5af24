//! Milestone estimation (Layer 2)
//!
//! Per-item completion estimates, one-hop dependency resolution, snapshot
//! annotation, and the population milestone rule.

#![warn(missing_docs)]

pub mod estimator;
pub mod dependency;
pub mod annotator;
pub mod milestone;
pub mod order;
pub mod format;
pub mod report;

pub use estimator::StageProgressionEstimator;
pub use dependency::{DependencyResolver, Resolution};
pub use annotator::{AnnotatedItem, AnnotationSet, SnapshotAnnotator};
pub use milestone::{AggregateMilestonePredictor, MilestonePrediction, DEFAULT_THRESHOLD};
pub use order::{Direction, MultiKeyOrder};
pub use format::{format_wait, DateFormatter};
pub use report::render_debug_dump;
