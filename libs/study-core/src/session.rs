//! Study session state.
//!
//! One `SessionContext` per module holds everything grading and scheduling
//! mutate: counters, item sets, review states and the set of items already
//! answered in the current pass.

use crate::algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::error::{Result, StudyError};
use crate::grading::{GradeReport, Grader, UserResponse};
use crate::progress::ProgressSnapshot;
use crate::types::{Difficulty, ReviewState, SessionStats, StudyItem};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Independently toggled sets of item ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSet {
    Bookmarked,
    Wrong,
    Completed,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    stats: SessionStats,
    bookmarked: BTreeSet<String>,
    wrong: BTreeSet<String>,
    completed: BTreeSet<String>,
    reviews: BTreeMap<String, ReviewState>,
    answered: HashSet<String>,
    current_index: usize,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from persisted progress. A new pass starts at the first item.
    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            stats: snapshot.stats,
            bookmarked: snapshot.bookmarked,
            wrong: snapshot.wrong,
            completed: snapshot.completed,
            reviews: snapshot.reviews,
            answered: HashSet::new(),
            current_index: 0,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            reviews: self.reviews.clone(),
            bookmarked: self.bookmarked.clone(),
            wrong: self.wrong.clone(),
            completed: self.completed.clone(),
            stats: self.stats.clone(),
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn items(&self, set: ItemSet) -> &BTreeSet<String> {
        match set {
            ItemSet::Bookmarked => &self.bookmarked,
            ItemSet::Wrong => &self.wrong,
            ItemSet::Completed => &self.completed,
        }
    }

    pub fn contains(&self, set: ItemSet, id: &str) -> bool {
        self.items(set).contains(id)
    }

    /// Flip membership of `id`; returns whether it is now a member.
    pub fn toggle(&mut self, set: ItemSet, id: &str) -> bool {
        let items = match set {
            ItemSet::Bookmarked => &mut self.bookmarked,
            ItemSet::Wrong => &mut self.wrong,
            ItemSet::Completed => &mut self.completed,
        };
        if items.remove(id) {
            false
        } else {
            items.insert(id.to_string());
            true
        }
    }

    pub fn toggle_bookmark(&mut self, id: &str) -> bool {
        self.toggle(ItemSet::Bookmarked, id)
    }

    pub fn review_state(&self, id: &str) -> Option<&ReviewState> {
        self.reviews.get(id)
    }

    pub fn reviews(&self) -> &BTreeMap<String, ReviewState> {
        &self.reviews
    }

    pub fn is_answered(&self, id: &str) -> bool {
        self.answered.contains(id)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    /// Record a graded attempt.
    ///
    /// Each item is graded at most once per pass. A pass adds the item to
    /// `completed`; a failure adds it to `wrong` and a pass removes it.
    pub fn record_grade(&mut self, id: &str, passed: bool) -> Result<()> {
        if !self.answered.insert(id.to_string()) {
            tracing::warn!(item = id, "rejected re-submission");
            return Err(StudyError::AlreadyAnswered(id.to_string()));
        }

        self.stats.record(passed);
        self.completed.insert(id.to_string());
        if passed {
            self.wrong.remove(id);
        } else {
            self.wrong.insert(id.to_string());
        }
        Ok(())
    }

    /// Grade a response and record the outcome.
    pub fn submit(
        &mut self,
        grader: &Grader,
        item: &StudyItem,
        response: &UserResponse,
    ) -> Result<GradeReport> {
        if self.is_answered(&item.id) {
            tracing::warn!(item = %item.id, "rejected re-submission");
            return Err(StudyError::AlreadyAnswered(item.id.clone()));
        }
        let report = grader.grade_item(item, response)?;
        self.record_grade(&item.id, report.passed)?;
        Ok(report)
    }

    /// Apply a flashcard self-assessment and store the new review state.
    pub fn record_review(
        &mut self,
        id: &str,
        difficulty: Difficulty,
        algorithm: &dyn SpacedRepetitionAlgorithm,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let state = self
            .reviews
            .get(id)
            .cloned()
            .unwrap_or_else(|| algorithm.initial_state());
        let result = algorithm.schedule(&state, difficulty, now);
        self.reviews.insert(id.to_string(), result.new_state.clone());
        self.completed.insert(id.to_string());
        result
    }

    /// Start a new pass over the items; progress is kept.
    pub fn begin_pass(&mut self) {
        self.answered.clear();
        self.current_index = 0;
    }

    /// Forget all progress, review states included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
