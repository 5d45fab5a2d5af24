//! Population threshold rule for the aggregate milestone.

use levelup_core::{Annotation, EstimatedDate};
use serde::Serialize;
use tracing::debug;

/// Fraction of the dependent population that must reach the milestone.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Outcome of a milestone prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestonePrediction {
    /// Predicted aggregate milestone date
    pub date: EstimatedDate,
    /// Number of items the rule was applied to
    pub population: usize,
    /// 1-based rank of the item whose date was taken (0 when empty)
    pub rank: usize,
}

/// Predicts when a fixed fraction of a population reaches the milestone.
#[derive(Debug, Clone, Copy)]
pub struct AggregateMilestonePredictor {
    threshold: f64,
}

impl AggregateMilestonePredictor {
    /// Create a predictor with the given threshold fraction.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 1-based rank selected for a population of `n` (`ceil(threshold * n)`,
    /// kept within `1..=n`).
    pub fn rank(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let rank = (self.threshold * n as f64).ceil();
        if rank.is_nan() || rank < 1.0 {
            1
        } else {
            (rank as usize).min(n)
        }
    }

    /// Apply the threshold rule to `annotations`.
    ///
    /// Items are ordered by predicted completion (stable, so ties keep input
    /// order) and the date at rank `ceil(threshold * n)` is returned: the
    /// first instant at which the required fraction is done. An empty
    /// population yields `Undetermined`.
    pub fn predict<'a>(
        &self,
        annotations: impl IntoIterator<Item = &'a Annotation>,
    ) -> MilestonePrediction {
        let mut dates: Vec<EstimatedDate> = annotations
            .into_iter()
            .map(|a| a.predicted_completion)
            .collect();
        dates.sort();

        let population = dates.len();
        let rank = self.rank(population);
        let date = match rank.checked_sub(1).and_then(|i| dates.get(i)) {
            Some(date) => *date,
            None => {
                debug!("Empty population, milestone undetermined");
                EstimatedDate::Undetermined
            }
        };

        MilestonePrediction {
            date,
            population,
            rank,
        }
    }
}

impl Default for AggregateMilestonePredictor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use levelup_core::{ItemClass, ItemId, Time};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn kanji(n: u64, predicted: EstimatedDate) -> Annotation {
        Annotation {
            id: ItemId::new(n),
            class: ItemClass::Dependent,
            is_locked: true,
            earliest_eligible_start: predicted,
            current_earliest_eligible_start: predicted,
            predicted_completion: predicted,
        }
    }

    #[test]
    fn test_rank_selection() {
        let predictor = AggregateMilestonePredictor::default();
        assert_eq!(predictor.rank(0), 0);
        assert_eq!(predictor.rank(1), 1);
        assert_eq!(predictor.rank(3), 3);
        assert_eq!(predictor.rank(10), 9);
        assert_eq!(predictor.rank(20), 18);
        assert_eq!(predictor.rank(33), 30);
    }

    #[test]
    fn test_rank_is_clamped() {
        assert_eq!(AggregateMilestonePredictor::new(0.0).rank(5), 1);
        assert_eq!(AggregateMilestonePredictor::new(1.5).rank(5), 5);
        assert_eq!(AggregateMilestonePredictor::new(f64::NAN).rank(5), 1);
    }

    #[test]
    fn test_ten_items_one_day_apart_takes_ninth() {
        // shuffled on purpose
        let annotations: Vec<_> = [4i64, 9, 1, 10, 3, 7, 2, 8, 6, 5]
            .iter()
            .map(|d| kanji(*d as u64, EstimatedDate::At(t0() + Duration::days(*d))))
            .collect();

        let prediction = AggregateMilestonePredictor::default().predict(&annotations);
        assert_eq!(prediction.date, EstimatedDate::At(t0() + Duration::days(9)));
        assert_eq!(prediction.population, 10);
        assert_eq!(prediction.rank, 9);
    }

    #[test]
    fn test_three_items_takes_last() {
        let annotations: Vec<_> = (1..=3)
            .map(|d| kanji(d, EstimatedDate::At(t0() + Duration::hours(d as i64))))
            .collect();

        let prediction = AggregateMilestonePredictor::default().predict(&annotations);
        assert_eq!(prediction.date, EstimatedDate::At(t0() + Duration::hours(3)));
    }

    #[test]
    fn test_empty_population_is_undetermined() {
        let prediction = AggregateMilestonePredictor::default().predict(std::iter::empty());
        assert!(prediction.date.is_undetermined());
        assert_eq!(prediction.population, 0);
        assert_eq!(prediction.rank, 0);
    }

    #[test]
    fn test_undetermined_items_sort_first() {
        let annotations = vec![
            kanji(1, EstimatedDate::At(t0())),
            kanji(2, EstimatedDate::Undetermined),
        ];
        let prediction = AggregateMilestonePredictor::new(0.5).predict(&annotations);
        assert!(prediction.date.is_undetermined());
    }
}
