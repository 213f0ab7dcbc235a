//! Grading and scheduling configuration.
//!
//! Global settings apply to every module; a module may override any field.
//! [`EffectiveSettings::merge`] resolves the two.

use crate::error::{Result, StudyError};
use crate::normalize::SynonymTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Matching mode for free-text answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Normalized equality only.
    Exact,
    /// Normalized equality, synonyms, digits, then keyword overlap.
    KeywordOverlap,
    /// As keyword overlap, with edit-distance similarity as the last rule.
    Fuzzy,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::KeywordOverlap
    }
}

/// Interval scheduler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub easy_multiplier: f64,
    pub medium_multiplier: f64,
    pub hard_multiplier: f64,
    pub minimum_interval_days: u32,
    pub maximum_interval_days: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            easy_multiplier: 2.5,
            medium_multiplier: 1.3,
            hard_multiplier: 0.5,
            minimum_interval_days: 1,
            maximum_interval_days: 30,
        }
    }
}

impl SchedulerSettings {
    pub const MIN_INTERVAL_DAYS: u32 = 1;
    pub const MAX_INTERVAL_DAYS: u32 = 30;

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("easy_multiplier", self.easy_multiplier),
            ("medium_multiplier", self.medium_multiplier),
            ("hard_multiplier", self.hard_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StudyError::InvalidSettings(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let bounds = Self::MIN_INTERVAL_DAYS..=Self::MAX_INTERVAL_DAYS;
        if !bounds.contains(&self.minimum_interval_days)
            || !bounds.contains(&self.maximum_interval_days)
            || self.minimum_interval_days > self.maximum_interval_days
        {
            return Err(StudyError::InvalidSettings(format!(
                "interval bounds {}..={} must lie within {}..={}",
                self.minimum_interval_days,
                self.maximum_interval_days,
                Self::MIN_INTERVAL_DAYS,
                Self::MAX_INTERVAL_DAYS
            )));
        }
        Ok(())
    }
}

/// Global settings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub matching_mode: MatchingMode,
    pub keyword_threshold: f64,
    pub fuzzy_threshold: f64,
    /// Questions graded on digits alone, slot by slot.
    pub digit_exact_ids: BTreeSet<String>,
    pub synonyms: SynonymTable,
    pub scheduler: SchedulerSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            matching_mode: MatchingMode::default(),
            keyword_threshold: 0.5,
            fuzzy_threshold: 0.8,
            digit_exact_ids: BTreeSet::new(),
            synonyms: SynonymTable::default(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl GlobalSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| StudyError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold("keyword_threshold", self.keyword_threshold)?;
        validate_threshold("fuzzy_threshold", self.fuzzy_threshold)?;
        self.scheduler.validate()
    }
}

/// Per-module settings (all fields optional for overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSettings {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_mode: Option<MatchingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit_exact_ids: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<SynonymTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerSettings>,
}

impl ModuleSettings {
    /// Create new module settings with only the module name set.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            matching_mode: None,
            keyword_threshold: None,
            fuzzy_threshold: None,
            digit_exact_ids: None,
            synonyms: None,
            scheduler: None,
        }
    }
}

/// Effective settings (global merged with module overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub matching_mode: MatchingMode,
    pub keyword_threshold: f64,
    pub fuzzy_threshold: f64,
    pub digit_exact_ids: BTreeSet<String>,
    pub synonyms: SynonymTable,
    pub scheduler: SchedulerSettings,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self::merge(&GlobalSettings::default(), None)
    }
}

impl EffectiveSettings {
    /// Merge global settings with optional module settings.
    pub fn merge(global: &GlobalSettings, module: Option<&ModuleSettings>) -> Self {
        match module {
            Some(m) => Self {
                matching_mode: m.matching_mode.unwrap_or(global.matching_mode),
                keyword_threshold: m.keyword_threshold.unwrap_or(global.keyword_threshold),
                fuzzy_threshold: m.fuzzy_threshold.unwrap_or(global.fuzzy_threshold),
                digit_exact_ids: m
                    .digit_exact_ids
                    .clone()
                    .unwrap_or_else(|| global.digit_exact_ids.clone()),
                synonyms: m.synonyms.clone().unwrap_or_else(|| global.synonyms.clone()),
                scheduler: m.scheduler.clone().unwrap_or_else(|| global.scheduler.clone()),
            },
            None => Self {
                matching_mode: global.matching_mode,
                keyword_threshold: global.keyword_threshold,
                fuzzy_threshold: global.fuzzy_threshold,
                digit_exact_ids: global.digit_exact_ids.clone(),
                synonyms: global.synonyms.clone(),
                scheduler: global.scheduler.clone(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold("keyword_threshold", self.keyword_threshold)?;
        validate_threshold("fuzzy_threshold", self.fuzzy_threshold)?;
        self.scheduler.validate()
    }
}

fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(StudyError::InvalidSettings(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let settings = EffectiveSettings::default();
        assert_eq!(settings.matching_mode, MatchingMode::KeywordOverlap);
        assert_eq!(settings.keyword_threshold, 0.5);
        assert_eq!(settings.scheduler.easy_multiplier, 2.5);
        assert_eq!(settings.scheduler.maximum_interval_days, 30);
        assert!(settings.digit_exact_ids.is_empty());
    }

    #[test]
    fn module_overrides_win() {
        let global = GlobalSettings::default();
        let mut module = ModuleSettings::new("exam_archive");
        module.keyword_threshold = Some(0.75);
        module.digit_exact_ids = Some(BTreeSet::from(["h03-17".to_string()]));

        let effective = EffectiveSettings::merge(&global, Some(&module));
        assert_eq!(effective.keyword_threshold, 0.75);
        assert!(effective.digit_exact_ids.contains("h03-17"));
        assert_eq!(effective.matching_mode, global.matching_mode);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings =
            GlobalSettings::from_json(r#"{"digit_exact_ids": ["h03-17"], "scheduler": {"hard_multiplier": 0.4}}"#)
                .unwrap();
        assert!(settings.digit_exact_ids.contains("h03-17"));
        assert_eq!(settings.scheduler.hard_multiplier, 0.4);
        assert_eq!(settings.scheduler.easy_multiplier, 2.5);
        assert_eq!(settings.keyword_threshold, 0.5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(GlobalSettings::from_json(r#"{"keyword_threshold": 0.0}"#).is_err());
        assert!(GlobalSettings::from_json(r#"{"scheduler": {"maximum_interval_days": 45}}"#).is_err());
        assert!(GlobalSettings::from_json(
            r#"{"scheduler": {"minimum_interval_days": 10, "maximum_interval_days": 5}}"#
        )
        .is_err());
        assert!(GlobalSettings::from_json(r#"{"scheduler": {"easy_multiplier": -1.0}}"#).is_err());
    }
}
