//! Study modules.
//!
//! Every content family (keyword lists, exam archives, certification and
//! project-management banks, theory flashcards) is served by the same
//! [`StudyDeck`], with the grader and scheduler injected and shared.

use crate::algorithm::{priority_key, SchedulingResult, SpacedRepetitionAlgorithm};
use crate::error::{Result, StudyError};
use crate::grading::{GradeReport, Grader, UserResponse};
use crate::session::{ItemSet, SessionContext};
use crate::types::{ContentFamily, Difficulty, StudyItem};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Operations the surrounding application drives a module through.
pub trait StudyModule {
    fn name(&self) -> &str;

    fn family(&self) -> ContentFamily;

    /// Replace the module's items and start a new pass.
    fn load(&mut self, items: Vec<StudyItem>, now: DateTime<Utc>) -> Result<()>;

    fn current_item(&self) -> Option<&StudyItem>;

    /// Grade the learner's response to the current item.
    fn grade(&mut self, response: &UserResponse) -> Result<GradeReport>;

    /// Record a self-assessment for the current flashcard.
    fn rate(&mut self, difficulty: Difficulty, now: DateTime<Utc>) -> Result<SchedulingResult>;

    /// Advance to the next item; `None` at the end.
    fn next(&mut self) -> Option<&StudyItem>;

    /// Step back to the previous item; `None` at the start.
    fn previous(&mut self) -> Option<&StudyItem>;

    /// Toggle the bookmark on the current item; returns whether it is now bookmarked.
    fn toggle_bookmark(&mut self) -> Result<bool>;

    fn session(&self) -> &SessionContext;
}

/// Generic study module over an ordered list of items.
pub struct StudyDeck {
    name: String,
    family: ContentFamily,
    items: Vec<StudyItem>,
    session: SessionContext,
    grader: Arc<Grader>,
    algorithm: Arc<dyn SpacedRepetitionAlgorithm>,
}

impl StudyDeck {
    pub fn new(
        name: impl Into<String>,
        family: ContentFamily,
        grader: Arc<Grader>,
        algorithm: Arc<dyn SpacedRepetitionAlgorithm>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            items: Vec::new(),
            session: SessionContext::new(),
            grader,
            algorithm,
        }
    }

    /// Continue from previously saved session state.
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = session;
        self
    }

    pub fn items(&self) -> &[StudyItem] {
        &self.items
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Keep only items that belong to `set`, e.g. to revisit wrong answers.
    pub fn retain_set(&mut self, set: ItemSet) {
        let members = self.session.items(set).clone();
        self.items.retain(|item| members.contains(&item.id));
        self.session.begin_pass();
    }

    fn current_id(&self) -> Result<String> {
        self.current_item()
            .map(|item| item.id.clone())
            .ok_or(StudyError::NoCurrentItem)
    }
}

impl StudyModule for StudyDeck {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> ContentFamily {
        self.family
    }

    fn load(&mut self, mut items: Vec<StudyItem>, now: DateTime<Utc>) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = items.iter().find(|item| !seen.insert(item.id.as_str())) {
            return Err(StudyError::DuplicateId(duplicate.id.clone()));
        }

        if self.family == ContentFamily::TheoryReview {
            let reviews = self.session.reviews();
            items.sort_by_key(|item| priority_key(reviews.get(&item.id), now));
        }

        tracing::debug!(module = %self.name, items = items.len(), "loaded items");
        self.items = items;
        self.session.begin_pass();
        Ok(())
    }

    fn current_item(&self) -> Option<&StudyItem> {
        self.items.get(self.session.current_index())
    }

    fn grade(&mut self, response: &UserResponse) -> Result<GradeReport> {
        let item = self
            .items
            .get(self.session.current_index())
            .ok_or(StudyError::NoCurrentItem)?;
        self.session.submit(&self.grader, item, response)
    }

    fn rate(&mut self, difficulty: Difficulty, now: DateTime<Utc>) -> Result<SchedulingResult> {
        let item = self
            .items
            .get(self.session.current_index())
            .ok_or(StudyError::NoCurrentItem)?;
        if !item.is_flashcard() {
            return Err(StudyError::NotAFlashcard {
                id: item.id.clone(),
            });
        }
        Ok(self
            .session
            .record_review(&item.id, difficulty, self.algorithm.as_ref(), now))
    }

    fn next(&mut self) -> Option<&StudyItem> {
        let index = self.session.current_index() + 1;
        if index >= self.items.len() {
            return None;
        }
        self.session.set_current_index(index);
        self.items.get(index)
    }

    fn previous(&mut self) -> Option<&StudyItem> {
        let index = self.session.current_index().checked_sub(1)?;
        self.session.set_current_index(index);
        self.items.get(index)
    }

    fn toggle_bookmark(&mut self) -> Result<bool> {
        let id = self.current_id()?;
        Ok(self.session.toggle_bookmark(&id))
    }

    fn session(&self) -> &SessionContext {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::IntervalScheduler;
    use crate::types::{ItemKind, ReviewState};
    use crate::progress::ProgressSnapshot;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn deck(family: ContentFamily) -> StudyDeck {
        StudyDeck::new(
            "test",
            family,
            Arc::new(Grader::default()),
            Arc::new(IntervalScheduler::default()),
        )
    }

    fn question(id: &str, answer: &str) -> StudyItem {
        StudyItem::new(id, "prompt", vec![answer], ItemKind::FreeText).unwrap()
    }

    fn card(id: &str) -> StudyItem {
        StudyItem::new(id, "front", vec!["back"], ItemKind::Flashcard).unwrap()
    }

    #[test]
    fn navigates_within_bounds() {
        let mut deck = deck(ContentFamily::KeywordList);
        deck.load(vec![question("q1", "a"), question("q2", "b")], now())
            .unwrap();

        assert!(deck.previous().is_none());
        assert_eq!(deck.next().map(|i| i.id.as_str()), Some("q2"));
        assert!(deck.next().is_none());
        assert_eq!(deck.current_item().map(|i| i.id.as_str()), Some("q2"));
        assert_eq!(deck.previous().map(|i| i.id.as_str()), Some("q1"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut deck = deck(ContentFamily::ExamArchive);
        let result = deck.load(vec![question("q1", "a"), question("q1", "b")], now());
        assert_eq!(result.unwrap_err(), StudyError::DuplicateId("q1".into()));
    }

    #[test]
    fn grades_current_item_once() {
        let mut deck = deck(ContentFamily::Certification);
        deck.load(vec![question("q1", "integrity")], now()).unwrap();

        let response = UserResponse::Slots(vec!["Integrity".into()]);
        assert!(deck.grade(&response).unwrap().passed);
        assert!(matches!(
            deck.grade(&response),
            Err(StudyError::AlreadyAnswered(_))
        ));
    }

    #[test]
    fn empty_deck_has_no_current_item() {
        let mut deck = deck(ContentFamily::ProjectManagement);
        let response = UserResponse::Slots(vec!["x".into()]);
        assert_eq!(deck.grade(&response).unwrap_err(), StudyError::NoCurrentItem);
        assert_eq!(deck.toggle_bookmark().unwrap_err(), StudyError::NoCurrentItem);
    }

    #[test]
    fn theory_review_orders_by_priority() {
        let mut snapshot = ProgressSnapshot::default();
        snapshot.reviews.insert(
            "f1".into(),
            ReviewState {
                attempts: 4,
                next_review: Some(now() + Duration::days(3)),
                ..ReviewState::default()
            },
        );
        snapshot.reviews.insert(
            "f2".into(),
            ReviewState {
                attempts: 1,
                next_review: Some(now() - Duration::days(1)),
                difficulty: Difficulty::Hard,
                ..ReviewState::default()
            },
        );

        let mut deck =
            deck(ContentFamily::TheoryReview).with_session(SessionContext::from_snapshot(snapshot));
        deck.load(vec![card("f1"), card("f3"), card("f2")], now())
            .unwrap();

        let order: Vec<_> = deck.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["f2", "f3", "f1"]);
    }

    #[test]
    fn rating_requires_a_flashcard() {
        let mut deck = deck(ContentFamily::TheoryReview);
        deck.load(vec![question("q1", "a"), card("f1")], now()).unwrap();
        assert!(matches!(
            deck.rate(Difficulty::Easy, now()),
            Err(StudyError::NotAFlashcard { .. })
        ));

        // Unreviewed question sorts first; move to the card
        deck.next();
        let result = deck.rate(Difficulty::Medium, now()).unwrap();
        assert_eq!(result.new_state.interval, 1);
        assert_eq!(deck.session().review_state("f1").unwrap().attempts, 1);
    }

    #[test]
    fn retain_set_focuses_on_wrong_answers() {
        let mut deck = deck(ContentFamily::ExamArchive);
        deck.load(vec![question("q1", "a"), question("q2", "서버")], now())
            .unwrap();
        deck.grade(&UserResponse::Slots(vec!["a".into()])).unwrap();
        deck.next();
        deck.grade(&UserResponse::Slots(vec!["전혀 다른 답".into()]))
            .unwrap();

        deck.retain_set(ItemSet::Wrong);

        assert_eq!(deck.items().len(), 1);
        assert_eq!(deck.current_item().map(|i| i.id.as_str()), Some("q2"));
        assert!(!deck.session().is_answered("q2"));
    }

    #[test]
    fn bookmark_toggles_current_item() {
        let mut deck = deck(ContentFamily::KeywordList);
        deck.load(vec![question("q1", "a")], now()).unwrap();
        assert!(deck.toggle_bookmark().unwrap());
        assert!(deck.session().contains(ItemSet::Bookmarked, "q1"));
        assert!(!deck.toggle_bookmark().unwrap());
    }
}
