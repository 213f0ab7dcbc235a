//! Persisted progress for one study module.

use crate::types::{ReviewState, SessionStats};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything a storage backend saves for a module.
///
/// Review records keep the browser field names (`lastReview`, `nextReview`,
/// ...); item sets are flat string arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    pub reviews: BTreeMap<String, ReviewState>,
    pub bookmarked: BTreeSet<String>,
    pub wrong: BTreeSet<String>,
    pub completed: BTreeSet<String>,
    pub stats: SessionStats,
}

impl ProgressSnapshot {
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
            && self.bookmarked.is_empty()
            && self.wrong.is_empty()
            && self.completed.is_empty()
            && self.stats == SessionStats::default()
    }
}
