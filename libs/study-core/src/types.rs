//! Core types for study sessions.

use crate::error::StudyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accepted answers for a question, in authoring order.
///
/// Never empty. Entries are stored as authored; normalization happens at
/// comparison time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AnswerKey(Vec<String>);

impl AnswerKey {
    /// Build an answer key, returning `None` when no answers are given.
    pub fn new<I, S>(answers: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let answers: Vec<String> = answers.into_iter().map(Into::into).collect();
        if answers.is_empty() {
            None
        } else {
            Some(Self(answers))
        }
    }

    pub fn slots(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for AnswerKey {
    type Error = &'static str;

    fn try_from(value: Vec<String>) -> std::result::Result<Self, Self::Error> {
        AnswerKey::new(value).ok_or("answer key must contain at least one answer")
    }
}

impl From<AnswerKey> for Vec<String> {
    fn from(key: AnswerKey) -> Self {
        key.0
    }
}

/// How an item is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// One or more free-text blanks, graded slot by slot.
    FreeText,
    /// Objective choice; `multi` questions accept several keys in any order.
    Choice { multi: bool },
    /// Theory card, self-rated and scheduled rather than graded.
    Flashcard,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::FreeText
    }
}

/// Content families served by study modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    KeywordList,
    ExamArchive,
    Certification,
    ProjectManagement,
    TheoryReview,
}

impl ContentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordList => "keyword_list",
            Self::ExamArchive => "exam_archive",
            Self::Certification => "certification",
            Self::ProjectManagement => "project_management",
            Self::TheoryReview => "theory_review",
        }
    }
}

/// A single question or flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: String,
    pub prompt: String,
    pub answer: AnswerKey,
    #[serde(default)]
    pub kind: ItemKind,
}

impl StudyItem {
    /// Create an item, rejecting an empty answer key.
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        prompt: impl Into<String>,
        answers: Vec<S>,
        kind: ItemKind,
    ) -> crate::Result<Self> {
        let id = id.into();
        let answer = AnswerKey::new(answers).ok_or_else(|| StudyError::EmptyAnswerKey {
            id: id.clone(),
        })?;
        Ok(Self {
            id,
            prompt: prompt.into(),
            answer,
            kind,
        })
    }

    pub fn is_flashcard(&self) -> bool {
        matches!(self.kind, ItemKind::Flashcard)
    }
}

/// A learner's answer to an objective choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceAnswer {
    Single(String),
    Multi(Vec<String>),
}

/// Learner's self-assessment after reviewing a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    /// Knew it.
    Easy,
    /// Uncertain.
    Medium,
    /// Did not know.
    Hard,
}

impl Difficulty {
    /// Convert to the 1-3 rating value.
    pub fn to_value(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Create from the 1-3 rating value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Easy),
            2 => Some(Self::Medium),
            3 => Some(Self::Hard),
            _ => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = StudyError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_value(value).ok_or(StudyError::InvalidDifficulty(value))
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.to_value()
    }
}

/// Per-item spaced repetition bookkeeping.
///
/// Serializes with the field names the persisted progress records use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub attempts: u32,
    pub correct: u32,
    #[serde(default, with = "iso_timestamp")]
    pub last_review: Option<DateTime<Utc>>,
    #[serde(default, with = "iso_timestamp")]
    pub next_review: Option<DateTime<Utc>>,
    pub difficulty: Difficulty,
    pub interval: u32,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            attempts: 0,
            correct: 0,
            last_review: None,
            next_review: None,
            difficulty: Difficulty::Easy,
            interval: 1,
        }
    }
}

impl ReviewState {
    /// Whether the item is due for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.is_some_and(|due| due <= now)
    }
}

/// Aggregate grading counters for a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl SessionStats {
    /// Count one graded attempt.
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.correct += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.wrong += 1;
            self.current_streak = 0;
        }
    }

    /// Fraction of attempts answered correctly, 0.0 when nothing was graded.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
