//! Spaced repetition scheduling.

pub mod interval;
pub mod priority;

use crate::types::{Difficulty, ReviewState};
use chrono::{DateTime, Utc};

pub use interval::{next_interval, IntervalScheduler};
pub use priority::{prioritize, priority_key, PriorityKey, Schedulable};

/// Result of scheduling a card after review.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_state: ReviewState,
    pub next_due: DateTime<Utc>,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Interval in days following a review rated `difficulty`.
    fn next_interval(&self, difficulty: Difficulty, current_interval_days: u32) -> u32;

    /// Calculate next review state after a review.
    fn schedule(
        &self,
        state: &ReviewState,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> SchedulingResult;

    /// State for a card that was never reviewed.
    fn initial_state(&self) -> ReviewState;
}
