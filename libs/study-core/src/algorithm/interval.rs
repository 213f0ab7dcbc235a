//! Multiplicative interval scheduler.
//!
//! Each self-assessment scales the previous interval: "knew it" grows it
//! aggressively, "uncertain" grows it mildly and "did not know" shrinks it
//! toward the minimum. The interval itself is the only persisted memory
//! strength; there is no separate ease factor.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::error::Result;
use crate::settings::SchedulerSettings;
use crate::types::{Difficulty, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Interval scheduler with configurable multipliers and bounds.
#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    settings: SchedulerSettings,
}

impl IntervalScheduler {
    pub fn new(settings: SchedulerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    fn multiplier(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.settings.easy_multiplier,
            Difficulty::Medium => self.settings.medium_multiplier,
            Difficulty::Hard => self.settings.hard_multiplier,
        }
    }
}

impl SpacedRepetitionAlgorithm for IntervalScheduler {
    fn name(&self) -> &'static str {
        "interval"
    }

    fn next_interval(&self, difficulty: Difficulty, current_interval_days: u32) -> u32 {
        let scaled = (f64::from(current_interval_days) * self.multiplier(difficulty)).round();
        let min = self.settings.minimum_interval_days;
        let max = self.settings.maximum_interval_days;
        // Saturating cast, then clamp into the configured bounds
        (scaled as u32).clamp(min, max)
    }

    fn schedule(
        &self,
        state: &ReviewState,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let interval = self.next_interval(difficulty, state.interval);
        let next_due = now + Duration::days(i64::from(interval));

        tracing::debug!(
            difficulty = difficulty.to_value(),
            previous = state.interval,
            interval,
            "scheduled review"
        );

        SchedulingResult {
            new_state: ReviewState {
                attempts: state.attempts + 1,
                correct: state.correct + u32::from(difficulty != Difficulty::Hard),
                last_review: Some(now),
                next_review: Some(next_due),
                difficulty,
                interval,
            },
            next_due,
        }
    }

    fn initial_state(&self) -> ReviewState {
        ReviewState {
            interval: self.settings.minimum_interval_days,
            ..ReviewState::default()
        }
    }
}

/// Next interval under the default multipliers and the 1-30 day bounds.
pub fn next_interval(difficulty: Difficulty, current_interval_days: u32) -> u32 {
    IntervalScheduler::default().next_interval(difficulty, current_interval_days)
}
