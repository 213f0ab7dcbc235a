//! Grading and scheduling core for study modules.
//!
//! Provides:
//! - Answer normalization and keyword/digit/synonym matching
//! - Multi-slot and objective choice grading
//! - Interval-based spaced repetition scheduling and review ordering
//! - Session state, progress snapshots and a generic study module
//! - Shared types (StudyItem, ReviewState, Difficulty, etc.)

pub mod algorithm;
pub mod error;
pub mod grading;
pub mod matching;
pub mod module;
pub mod normalize;
pub mod progress;
pub mod session;
pub mod settings;
pub mod types;

pub use algorithm::{
    next_interval, prioritize, IntervalScheduler, SchedulingResult, SpacedRepetitionAlgorithm,
};
pub use error::{Result, StudyError};
pub use grading::{GradePath, GradeReport, Grader, UserResponse};
pub use matching::{
    compare_answers, levenshtein_distance, matches, normalized_similarity, MatchResult, MatchRule,
};
pub use module::{StudyDeck, StudyModule};
pub use normalize::{normalize, normalize_for_synonym, remap_choice_key, SynonymTable};
pub use progress::ProgressSnapshot;
pub use session::{ItemSet, SessionContext};
pub use settings::{EffectiveSettings, GlobalSettings, MatchingMode, ModuleSettings, SchedulerSettings};
pub use types::{
    AnswerKey, ChoiceAnswer, ContentFamily, Difficulty, ItemKind, ReviewState, SessionStats,
    StudyItem,
};
