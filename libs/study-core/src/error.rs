//! Error types for study-core.

use thiserror::Error;

/// Result type alias using StudyError.
pub type Result<T> = std::result::Result<T, StudyError>;

/// Errors raised by caller misuse of the study core.
///
/// A wrong answer is never an error; grading always yields a boolean.
#[derive(Debug, Error, PartialEq)]
pub enum StudyError {
    #[error("answer key for item {id} is empty")]
    EmptyAnswerKey { id: String },

    #[error("invalid difficulty rating: {0} (expected 1, 2 or 3)")]
    InvalidDifficulty(u8),

    #[error("duplicate item id {0}")]
    DuplicateId(String),

    #[error("item {0} was already graded in this pass")]
    AlreadyAnswered(String),

    #[error("no current item")]
    NoCurrentItem,

    #[error("item {id} is a flashcard and is rated, not graded")]
    NotGradable { id: String },

    #[error("item {id} is not a flashcard")]
    NotAFlashcard { id: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
