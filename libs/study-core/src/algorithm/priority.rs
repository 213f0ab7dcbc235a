//! Review ordering for flashcard decks.

use crate::types::{Difficulty, ReviewState};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Anything that can be placed in a review queue.
pub trait Schedulable {
    /// Review state, or `None` for a card never reviewed.
    fn review_state(&self) -> Option<&ReviewState>;
}

impl Schedulable for ReviewState {
    fn review_state(&self) -> Option<&ReviewState> {
        Some(self)
    }
}

impl Schedulable for Option<ReviewState> {
    fn review_state(&self) -> Option<&ReviewState> {
        self.as_ref()
    }
}

impl<T: Schedulable> Schedulable for &T {
    fn review_state(&self) -> Option<&ReviewState> {
        (**self).review_state()
    }
}

/// Sort key: due items first, then harder, then less practiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    not_due: bool,
    difficulty: Reverse<Difficulty>,
    attempts: u32,
}

/// Priority key for a review state at `now`.
///
/// A missing state counts as never reviewed: lowest difficulty, no attempts,
/// no due date.
pub fn priority_key(state: Option<&ReviewState>, now: DateTime<Utc>) -> PriorityKey {
    match state {
        Some(state) => PriorityKey {
            not_due: !state.is_due(now),
            difficulty: Reverse(state.difficulty),
            attempts: state.attempts,
        },
        None => PriorityKey {
            not_due: true,
            difficulty: Reverse(Difficulty::Easy),
            attempts: 0,
        },
    }
}

/// Reorder items for review. The sort is stable.
pub fn prioritize<T: Schedulable>(items: &mut [T], now: DateTime<Utc>) {
    items.sort_by_key(|item| priority_key(item.review_state(), now));
}
