//! Progression stage ladder and the stage duration table.

use serde::{Deserialize, Serialize};

/// Hours spent waiting between consecutive apprentice stages, from the
/// lesson stage up to the milestone.
const STAGE_INTERVAL_HOURS: [u32; 4] = [4, 8, 23, 47];

const STAGE_LABELS: [&str; 10] = [
    "Unlocked",
    "Apprentice 1",
    "Apprentice 2",
    "Apprentice 3",
    "Apprentice 4",
    "Guru 1",
    "Guru 2",
    "Master",
    "Enlighten",
    "Burn",
];

/// Position of an item on the progression ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(u8);

impl Stage {
    /// Lesson not yet taken
    pub const UNLOCKED: Stage = Stage(0);
    /// First "guru-equivalent" stage
    pub const MILESTONE: Stage = Stage(5);
    /// Fully passed ("burn-equivalent")
    pub const FINAL: Stage = Stage(9);

    /// Create a stage from its numeric position.
    pub const fn new(stage: u8) -> Self {
        Self(stage)
    }

    /// Numeric position on the ladder.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether the stage is at or past the milestone.
    pub fn reached_milestone(self) -> bool {
        self >= Self::MILESTONE
    }

    /// Human readable label.
    pub fn label(self) -> String {
        STAGE_LABELS
            .get(usize::from(self.0))
            .map(|label| (*label).to_string())
            .unwrap_or_else(|| format!("Stage {}", self.0))
    }
}

impl From<u8> for Stage {
    fn from(stage: u8) -> Self {
        Self(stage)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Static lookup of cumulative wait time until the milestone stage.
pub struct StageDurationTable;

impl StageDurationTable {
    /// Hours remaining until the milestone for an item sitting at `stage`.
    ///
    /// Only the apprentice stages (0..=3) are tabulated; later stages return
    /// `None` and are left to the caller.
    pub fn hours_to_milestone(stage: Stage) -> Option<u32> {
        let start = usize::from(stage.value());
        if start >= STAGE_INTERVAL_HOURS.len() {
            return None;
        }
        Some(STAGE_INTERVAL_HOURS[start..].iter().sum())
    }

    /// Every tabulated `(stage, hours)` pair, lowest stage first.
    pub fn entries() -> impl Iterator<Item = (Stage, u32)> {
        (0..STAGE_INTERVAL_HOURS.len() as u8).filter_map(|s| {
            let stage = Stage::new(s);
            Self::hours_to_milestone(stage).map(|hours| (stage, hours))
        })
    }
}
