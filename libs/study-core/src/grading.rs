//! Multi-slot grading.
//!
//! A question passes only when the learner filled exactly as many slots as the
//! answer key has and every slot matches its counterpart at the same index.
//! Questions listed in `digit_exact_ids` skip text matching and compare digits
//! only.

use crate::error::{Result, StudyError};
use crate::matching::{compare_answers, extract_digits, MatchResult, MatchRule};
use crate::normalize::{normalize_for_synonym, remap_choice_key};
use crate::settings::EffectiveSettings;
use crate::types::{AnswerKey, ChoiceAnswer, ItemKind, StudyItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw learner input for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UserResponse {
    /// One string per blank, in order.
    Slots(Vec<String>),
    /// Selected choice key(s).
    Choice(ChoiceAnswer),
}

/// How a question was graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradePath {
    /// Slot counts differed; nothing was compared.
    SlotCountMismatch,
    /// Digit-only comparison for a flagged question.
    DigitExact,
    /// Each slot matched against the key at the same index.
    PerSlot,
    /// Multi-select choice compared as sets.
    ChoiceSet,
}

/// Outcome of grading one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub passed: bool,
    pub path: GradePath,
    /// Per-slot results, in slot order. Empty for set comparisons and count mismatches.
    pub slots: Vec<MatchResult>,
}

impl GradeReport {
    fn mismatch() -> Self {
        Self {
            passed: false,
            path: GradePath::SlotCountMismatch,
            slots: Vec::new(),
        }
    }
}

/// Grades answers against answer keys under one set of effective settings.
#[derive(Debug, Clone, Default)]
pub struct Grader {
    settings: EffectiveSettings,
}

impl Grader {
    pub fn new(settings: EffectiveSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EffectiveSettings {
        &self.settings
    }

    /// Compare one free-text answer to one accepted answer.
    pub fn compare(&self, user: &str, correct: &str) -> MatchResult {
        compare_answers(user, correct, &self.settings)
    }

    pub fn matches(&self, user: &str, correct: &str) -> bool {
        self.compare(user, correct).is_correct
    }

    /// Grade slot answers against answer keys, reporting every slot.
    pub fn evaluate<S, K>(&self, question_id: &str, answers: &[S], keys: &[K]) -> GradeReport
    where
        S: AsRef<str>,
        K: AsRef<str>,
    {
        if answers.len() != keys.len() {
            tracing::debug!(
                question_id,
                answers = answers.len(),
                keys = keys.len(),
                "slot count mismatch"
            );
            return GradeReport::mismatch();
        }

        let (path, slots): (_, Vec<MatchResult>) =
            if self.settings.digit_exact_ids.contains(question_id) {
                let slots = answers
                    .iter()
                    .zip(keys)
                    .map(|(user, key)| digit_exact(user.as_ref(), key.as_ref()))
                    .collect();
                (GradePath::DigitExact, slots)
            } else {
                let slots = answers
                    .iter()
                    .zip(keys)
                    .map(|(user, key)| self.compare(user.as_ref(), key.as_ref()))
                    .collect();
                (GradePath::PerSlot, slots)
            };

        let passed = slots.iter().all(|slot| slot.is_correct);
        tracing::debug!(question_id, ?path, passed, "graded question");

        GradeReport {
            passed,
            path,
            slots,
        }
    }

    /// Grade slot answers against answer keys.
    pub fn grade_slots<S, K>(&self, question_id: &str, answers: &[S], keys: &[K]) -> bool
    where
        S: AsRef<str>,
        K: AsRef<str>,
    {
        self.evaluate(question_id, answers, keys).passed
    }

    /// Grade an objective choice answer.
    ///
    /// Keys are remapped to numerals first. Multi-select answers compare as
    /// sets; a single answer is a one-slot question.
    pub fn evaluate_choice(&self, question_id: &str, answer: &ChoiceAnswer, key: &AnswerKey) -> GradeReport {
        match answer {
            ChoiceAnswer::Multi(selected) => {
                let selected: BTreeSet<String> = selected.iter().map(|s| remap_choice_key(s)).collect();
                let expected: BTreeSet<String> =
                    key.slots().iter().map(|s| remap_choice_key(s)).collect();
                let passed = !selected.is_empty() && selected == expected;
                tracing::debug!(question_id, passed, "graded multi-select choice");
                GradeReport {
                    passed,
                    path: GradePath::ChoiceSet,
                    slots: Vec::new(),
                }
            }
            ChoiceAnswer::Single(selected) => {
                let [expected] = key.slots() else {
                    return GradeReport::mismatch();
                };
                let user = normalize_for_synonym(&remap_choice_key(selected), &self.settings.synonyms);
                let correct = normalize_for_synonym(&remap_choice_key(expected), &self.settings.synonyms);
                self.evaluate(question_id, &[user], &[correct])
            }
        }
    }

    /// Grade a learner's response to an item.
    pub fn grade_item(&self, item: &StudyItem, response: &UserResponse) -> Result<GradeReport> {
        let report = match (item.kind, response) {
            (ItemKind::Flashcard, _) => {
                return Err(StudyError::NotGradable {
                    id: item.id.clone(),
                })
            }
            (ItemKind::FreeText, UserResponse::Slots(answers)) => {
                self.evaluate(&item.id, answers, item.answer.slots())
            }
            (ItemKind::FreeText, UserResponse::Choice(ChoiceAnswer::Single(answer))) => {
                self.evaluate(&item.id, std::slice::from_ref(answer), item.answer.slots())
            }
            (ItemKind::FreeText, UserResponse::Choice(ChoiceAnswer::Multi(answers))) => {
                self.evaluate(&item.id, answers, item.answer.slots())
            }
            (ItemKind::Choice { .. }, UserResponse::Choice(answer)) => {
                self.evaluate_choice(&item.id, answer, &item.answer)
            }
            (ItemKind::Choice { multi }, UserResponse::Slots(answers)) => {
                let answer = match answers.as_slice() {
                    [single] if !multi => ChoiceAnswer::Single(single.clone()),
                    _ => ChoiceAnswer::Multi(answers.clone()),
                };
                self.evaluate_choice(&item.id, &answer, &item.answer)
            }
        };
        Ok(report)
    }
}

fn digit_exact(user: &str, correct: &str) -> MatchResult {
    let user_digits = extract_digits(user);
    let correct_digits = extract_digits(correct);
    let is_correct = !user_digits.is_empty() && user_digits == correct_digits;
    MatchResult {
        is_correct,
        rule: is_correct.then_some(MatchRule::Digits),
        score: if is_correct { 1.0 } else { 0.0 },
        user_normalized: user_digits,
        correct_normalized: correct_digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GlobalSettings;
    use pretty_assertions::assert_eq;

    fn grader_with_digit_exact(id: &str) -> Grader {
        let global = GlobalSettings {
            digit_exact_ids: BTreeSet::from([id.to_string()]),
            ..GlobalSettings::default()
        };
        Grader::new(EffectiveSettings::merge(&global, None)).unwrap()
    }

    #[test]
    fn slot_count_mismatch_fails() {
        let grader = Grader::default();
        let report = grader.evaluate("q1", &["1"], &["1", "2"]);
        assert!(!report.passed);
        assert_eq!(report.path, GradePath::SlotCountMismatch);
        assert!(!grader.grade_slots("q1", &["1", "2", "3"], &["1", "2"]));
    }

    #[test]
    fn every_slot_must_match_in_order() {
        let grader = Grader::default();
        assert!(grader.grade_slots("q1", &["서버 ", "Client"], &["서버", "클라이언트"]));
        assert!(!grader.grade_slots("q1", &["Client", "서버"], &["서버", "클라이언트"]));
        assert!(!grader.grade_slots("q1", &["서버", "전혀 다른 답"], &["서버", "클라이언트"]));
    }

    #[test]
    fn digit_exact_questions_compare_digits_only() {
        let grader = grader_with_digit_exact("h03-17");
        let report = grader.evaluate("h03-17", &["정답은 3가지"], &["3"]);
        assert!(report.passed);
        assert_eq!(report.path, GradePath::DigitExact);

        assert!(!grader.grade_slots("h03-17", &["정답은 4가지"], &["3"]));
        assert!(!grader.grade_slots("h03-17", &["정답은 셋"], &["3"]));
    }

    #[test]
    fn digit_exact_is_scoped_to_flagged_ids() {
        let grader = grader_with_digit_exact("h03-17");
        let report = grader.evaluate("other", &["정답은 3가지"], &["3"]);
        assert_eq!(report.path, GradePath::PerSlot);
        assert!(report.passed);
        assert_eq!(report.slots[0].rule, Some(MatchRule::Digits));
    }

    #[test]
    fn single_choice_remaps_glyphs() {
        let grader = Grader::default();
        let key = AnswerKey::new(["③"]).unwrap();
        assert!(grader.evaluate_choice("c1", &ChoiceAnswer::Single("3".into()), &key).passed);
        assert!(grader.evaluate_choice("c1", &ChoiceAnswer::Single("ㄷ".into()), &key).passed);
        assert!(grader.evaluate_choice("c1", &ChoiceAnswer::Single("c".into()), &key).passed);
        assert!(!grader.evaluate_choice("c1", &ChoiceAnswer::Single("②".into()), &key).passed);
    }

    #[test]
    fn single_choice_uses_synonyms() {
        let grader = Grader::default();
        let key = AnswerKey::new(["기본키"]).unwrap();
        assert!(grader.evaluate_choice("c2", &ChoiceAnswer::Single("PK".into()), &key).passed);
    }

    #[test]
    fn multi_select_is_order_insensitive() {
        let grader = Grader::default();
        let key = AnswerKey::new(["①", "③"]).unwrap();
        let answer = ChoiceAnswer::Multi(vec!["c".into(), "1".into()]);
        let report = grader.evaluate_choice("c3", &answer, &key);
        assert!(report.passed);
        assert_eq!(report.path, GradePath::ChoiceSet);

        let partial = ChoiceAnswer::Multi(vec!["1".into()]);
        assert!(!grader.evaluate_choice("c3", &partial, &key).passed);
        let empty = ChoiceAnswer::Multi(vec![]);
        assert!(!grader.evaluate_choice("c3", &empty, &key).passed);
    }

    #[test]
    fn flashcards_are_not_gradable() {
        let grader = Grader::default();
        let card = StudyItem::new("f1", "What is ACID?", vec!["atomicity"], ItemKind::Flashcard).unwrap();
        let result = grader.grade_item(&card, &UserResponse::Slots(vec!["atomicity".into()]));
        assert_eq!(result.unwrap_err(), StudyError::NotGradable { id: "f1".into() });
    }

    #[test]
    fn grade_item_dispatches_by_kind() {
        let grader = Grader::default();
        let blank = StudyItem::new("b1", "Two roles?", vec!["서버", "클라이언트"], ItemKind::FreeText).unwrap();
        let response = UserResponse::Slots(vec!["server".into(), "client".into()]);
        assert!(grader.grade_item(&blank, &response).unwrap().passed);

        let choice =
            StudyItem::new("c1", "Pick one", vec!["②"], ItemKind::Choice { multi: false }).unwrap();
        let response = UserResponse::Slots(vec!["b".into()]);
        assert!(grader.grade_item(&choice, &response).unwrap().passed);
    }
}
