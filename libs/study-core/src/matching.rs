//! Answer matching for a single answer slot.

use crate::normalize::{normalize, normalize_keeping_words};
use crate::settings::{EffectiveSettings, MatchingMode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Which rule accepted an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Normalized forms are identical.
    Exact,
    /// Both sides belong to the same synonym group.
    Synonym,
    /// Digit-only forms are identical.
    Digits,
    /// Enough keywords overlap.
    Keywords,
    /// Edit-distance similarity above the fuzzy threshold.
    Fuzzy,
}

/// Result of comparing one answer to one accepted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// The rule that accepted the answer, if any.
    pub rule: Option<MatchRule>,
    /// Keyword match rate or similarity, depending on the mode; 1.0 for exact rules.
    pub score: f64,
    /// Normalized user answer (for display).
    pub user_normalized: String,
    /// Normalized accepted answer (for display).
    pub correct_normalized: String,
}

/// Match a free-text answer with the default settings.
pub fn matches(user: &str, correct: &str) -> bool {
    static DEFAULTS: OnceLock<EffectiveSettings> = OnceLock::new();
    let settings = DEFAULTS.get_or_init(EffectiveSettings::default);
    compare_answers(user, correct, settings).is_correct
}

/// Compare a user answer to an accepted answer.
///
/// Rules run in order and the first that fires wins: normalized equality,
/// synonym group, digit-only equality, then keyword overlap (or edit-distance
/// similarity in fuzzy mode). An answer that normalizes to nothing never matches.
pub fn compare_answers(user: &str, correct: &str, settings: &EffectiveSettings) -> MatchResult {
    let user_normalized = normalize(user);
    let correct_normalized = normalize(correct);

    let (rule, score) = if user_normalized.is_empty() {
        (None, 0.0)
    } else if user_normalized == correct_normalized {
        (Some(MatchRule::Exact), 1.0)
    } else if settings.matching_mode == MatchingMode::Exact {
        (None, 0.0)
    } else if same_synonym_group(&user_normalized, &correct_normalized, settings) {
        (Some(MatchRule::Synonym), 1.0)
    } else if digits_match(&user_normalized, &correct_normalized) {
        (Some(MatchRule::Digits), 1.0)
    } else if settings.matching_mode == MatchingMode::Fuzzy {
        let similarity = normalized_similarity(&user_normalized, &correct_normalized);
        let rule = (similarity >= settings.fuzzy_threshold).then_some(MatchRule::Fuzzy);
        (rule, similarity)
    } else {
        let rate = keyword_match_rate(
            &extract_keywords(&normalize_keeping_words(user)),
            &extract_keywords(&normalize_keeping_words(correct)),
        )
        .unwrap_or(0.0);
        let rule = (rate >= settings.keyword_threshold).then_some(MatchRule::Keywords);
        (rule, rate)
    };

    MatchResult {
        is_correct: rule.is_some(),
        rule,
        score,
        user_normalized,
        correct_normalized,
    }
}

fn same_synonym_group(user: &str, correct: &str, settings: &EffectiveSettings) -> bool {
    match (
        settings.synonyms.canonical(user),
        settings.synonyms.canonical(correct),
    ) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn digits_match(user: &str, correct: &str) -> bool {
    let user_digits = extract_digits(user);
    !user_digits.is_empty() && user_digits == extract_digits(correct)
}

/// Keep only the ASCII digits of a string.
pub fn extract_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hangul,
    Latin,
}

fn script_of(c: char) -> Option<Script> {
    match c {
        '\u{AC00}'..='\u{D7A3}' => Some(Script::Hangul),
        c if c.is_ascii_alphabetic() => Some(Script::Latin),
        _ => None,
    }
}

/// Split text into keywords: maximal runs of Hangul syllables or of ASCII letters.
pub fn extract_keywords(s: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut current = String::new();
    let mut current_script = None;

    for c in s.chars() {
        let script = script_of(c);
        if script != current_script && !current.is_empty() {
            keywords.push(std::mem::take(&mut current));
        }
        if script.is_some() {
            current.push(c.to_ascii_lowercase());
        }
        current_script = script;
    }
    if !current.is_empty() {
        keywords.push(current);
    }

    keywords
}

/// Share of keywords that overlap by substring containment in either direction.
///
/// Returns `None` when either side has no keywords.
pub fn keyword_match_rate(user: &[String], correct: &[String]) -> Option<f64> {
    if user.is_empty() || correct.is_empty() {
        return None;
    }

    let hits = user
        .iter()
        .filter(|u| {
            correct
                .iter()
                .any(|c| c.contains(u.as_str()) || u.contains(c.as_str()))
        })
        .count();

    Some(hits as f64 / user.len().max(correct.len()) as f64)
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Calculate normalized similarity (0.0 to 1.0) based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}
