//! Completion time estimation.

use levelup_core::{EstimatedDate, Stage, StageDurationTable, Time};
use tracing::debug;

/// Predicts when a single item reaches the milestone stage.
pub struct StageProgressionEstimator;

impl StageProgressionEstimator {
    /// Estimate the milestone date of one item.
    ///
    /// A completed item returns its completion time unchanged. Otherwise the
    /// tabulated hours for `stage` are added to `current_earliest_start`;
    /// stages the table does not cover add nothing.
    pub fn estimate(
        &self,
        current_earliest_start: EstimatedDate,
        stage: Stage,
        completed_at: Option<Time>,
    ) -> EstimatedDate {
        if let Some(done) = completed_at {
            return EstimatedDate::At(done);
        }

        let hours = StageDurationTable::hours_to_milestone(stage).unwrap_or_else(|| {
            debug!("Stage {} is past the duration table, adding 0h", stage.value());
            0
        });
        current_earliest_start.plus_hours(hours)
    }
}

impl Default for StageProgressionEstimator {
    fn default() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_adds_tabulated_hours() {
        let estimator = StageProgressionEstimator;
        for (stage, hours) in [(0u8, 82), (1, 78), (2, 70), (3, 47)] {
            let date = estimator.estimate(EstimatedDate::At(t0()), Stage::new(stage), None);
            assert_eq!(date, EstimatedDate::At(t0() + Duration::hours(hours)));
        }
    }

    #[test]
    fn test_untabulated_stage_adds_nothing() {
        let estimator = StageProgressionEstimator;
        let date = estimator.estimate(EstimatedDate::At(t0()), Stage::new(4), None);
        assert_eq!(date, EstimatedDate::At(t0()));
        let date = estimator.estimate(EstimatedDate::At(t0()), Stage::FINAL, None);
        assert_eq!(date, EstimatedDate::At(t0()));
    }

    #[test]
    fn test_completed_item_keeps_its_date() {
        let estimator = StageProgressionEstimator;
        let done = t0() - Duration::days(3);
        let date = estimator.estimate(EstimatedDate::At(t0()), Stage::new(0), Some(done));
        assert_eq!(date, EstimatedDate::At(done));

        let date = estimator.estimate(EstimatedDate::Undetermined, Stage::new(2), Some(done));
        assert_eq!(date, EstimatedDate::At(done));
    }

    #[test]
    fn test_undetermined_start_stays_undetermined() {
        let estimator = StageProgressionEstimator;
        let date = estimator.estimate(EstimatedDate::Undetermined, Stage::new(1), None);
        assert!(date.is_undetermined());
    }
}
