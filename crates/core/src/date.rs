//! Estimated dates with an explicit "undetermined" marker.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::Time;

/// A date produced by the estimator.
///
/// `Undetermined` marks a date that could not be derived from the snapshot
/// (for example a locked item none of whose prerequisites are present). It
/// orders before every concrete date, so it never wins a "latest of" scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Time>", into = "Option<Time>")]
pub enum EstimatedDate {
    /// No date could be derived
    #[default]
    Undetermined,
    /// A concrete instant
    At(Time),
}

impl EstimatedDate {
    /// The concrete instant, if any.
    pub fn at(self) -> Option<Time> {
        match self {
            Self::At(t) => Some(t),
            Self::Undetermined => None,
        }
    }

    /// Whether this is the undetermined marker.
    pub fn is_undetermined(self) -> bool {
        matches!(self, Self::Undetermined)
    }

    /// Clamp a concrete date so it is never earlier than `now`.
    pub fn not_before(self, now: Time) -> Self {
        match self {
            Self::At(t) => Self::At(t.max(now)),
            Self::Undetermined => Self::Undetermined,
        }
    }

    /// Shift a concrete date forward by whole hours.
    pub fn plus_hours(self, hours: u32) -> Self {
        match self {
            Self::At(t) => Self::At(t + Duration::hours(i64::from(hours))),
            Self::Undetermined => Self::Undetermined,
        }
    }

    /// Concrete and at or before `now`.
    pub fn is_due(self, now: Time) -> bool {
        matches!(self, Self::At(t) if t <= now)
    }

    /// Concrete and strictly after `now`.
    pub fn is_after(self, now: Time) -> bool {
        matches!(self, Self::At(t) if t > now)
    }
}

impl From<Time> for EstimatedDate {
    fn from(t: Time) -> Self {
        Self::At(t)
    }
}

impl From<Option<Time>> for EstimatedDate {
    fn from(t: Option<Time>) -> Self {
        t.map_or(Self::Undetermined, Self::At)
    }
}

impl From<EstimatedDate> for Option<Time> {
    fn from(date: EstimatedDate) -> Self {
        date.at()
    }
}
