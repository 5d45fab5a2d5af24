//! Execution layer - study-set selection, recompute scheduling, and the
//! refresh engine tying them to an item source.

#![warn(missing_docs)]

pub mod selector;
pub mod scheduler;
pub mod summary;
pub mod context;
pub mod clock;
pub mod engine;

pub use selector::SoonestActionableSetSelector;
pub use scheduler::{RecomputeScheduler, SchedulerState};
pub use summary::{ActionHint, Destination, EstimateSummary, StudySet};
pub use context::EstimationContext;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{
    DebugConfig, EngineConfig, EngineError, RefreshEngine, RefreshHandle, RefreshOutcome,
    RefreshReason,
};
