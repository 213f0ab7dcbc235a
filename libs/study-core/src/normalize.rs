//! Answer text canonicalization.
//!
//! Every comparison in the grader runs on normalized text so that casing,
//! spacing, annotations in parentheses, and a handful of separators never
//! decide whether an answer is right.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Circled consonants and the jamo they stand for.
const CIRCLED_JAMO: [(char, char); 10] = [
    ('㉠', 'ㄱ'),
    ('㉡', 'ㄴ'),
    ('㉢', 'ㄷ'),
    ('㉣', 'ㄹ'),
    ('㉤', 'ㅁ'),
    ('㉥', 'ㅂ'),
    ('㉦', 'ㅅ'),
    ('㉧', 'ㅇ'),
    ('㉨', 'ㅈ'),
    ('㉩', 'ㅊ'),
];

/// Separators dropped wherever they occur.
const STRIPPED_PUNCTUATION: [char; 5] = ['·', ',', '→', '-', '.'];

const CIRCLED_DIGITS: [char; 10] = ['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩'];
const JAMO_KEYS: [char; 10] = ['ㄱ', 'ㄴ', 'ㄷ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅅ', 'ㅇ', 'ㅈ', 'ㅊ'];
const LATIN_KEYS: [char; 10] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j'];

/// Canonicalize an answer for comparison.
///
/// Lowercases, maps circled consonants to jamo, drops `(...)` annotations,
/// strips separators and removes all whitespace. Idempotent.
pub fn normalize(raw: &str) -> String {
    let text = strip_parentheticals(&map_circled_jamo(&raw.to_lowercase()));
    text.chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c) && !c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Like [`normalize`] but keeps word boundaries as single spaces.
///
/// Keyword extraction needs the boundaries the learner typed; separators
/// become spaces instead of vanishing.
pub(crate) fn normalize_keeping_words(raw: &str) -> String {
    let text = strip_parentheticals(&map_circled_jamo(&raw.to_lowercase()));
    text.chars()
        .map(|c| if STRIPPED_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonicalize a single-token objective answer through the synonym table.
pub fn normalize_for_synonym(raw: &str, synonyms: &SynonymTable) -> String {
    let token = strip_whitespace(&raw.to_lowercase());
    match synonyms.canonical(&token) {
        Some(canonical) => canonical.to_string(),
        None => token,
    }
}

/// Map a choice key glyph to its numeral.
///
/// Circled digits, jamo letters (plain or circled) and latin letters `a`-`j`
/// all remap to `"1"`-`"10"`. Anything else is returned trimmed and lowercased.
pub fn remap_choice_key(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    let mut chars = trimmed.chars();
    let (Some(glyph), None) = (chars.next(), chars.next()) else {
        return trimmed;
    };
    let glyph = map_circled_jamo_char(glyph);

    [&CIRCLED_DIGITS, &JAMO_KEYS, &LATIN_KEYS]
        .iter()
        .find_map(|table| table.iter().position(|&c| c == glyph))
        .map(|index| (index + 1).to_string())
        .unwrap_or(trimmed)
}

fn map_circled_jamo_char(c: char) -> char {
    CIRCLED_JAMO
        .iter()
        .find(|(circled, _)| *circled == c)
        .map(|&(_, jamo)| jamo)
        .unwrap_or(c)
}

fn map_circled_jamo(s: &str) -> String {
    s.chars().map(map_circled_jamo_char).collect()
}

/// Remove `(...)` spans, delimiters included. An unmatched `(` is kept.
fn strip_parentheticals(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                result.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    result.push_str(rest);
    result
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Synonym groups: canonical term mapped to its equivalent surface forms.
///
/// Lookups lowercase and strip the input; stored forms are compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable(BTreeMap<String, Vec<String>>);

impl SynonymTable {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self(groups)
    }

    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Canonical key of the group `token` belongs to, if any.
    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(canonical, forms)| {
                canonical.as_str() == token || forms.iter().any(|form| form == token)
            })
            .map(|(canonical, _)| canonical.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let groups = [
            ("서버", &["server"][..]),
            ("클라이언트", &["client"][..]),
            ("무결성", &["integrity"][..]),
            ("관계", &["relationship", "relation"][..]),
            ("기본키", &["primarykey", "pk"][..]),
            ("외래키", &["foreignkey", "fk"][..]),
            ("트랜잭션", &["transaction"][..]),
            ("정규화", &["normalization"][..]),
            ("인덱스", &["index"][..]),
            ("이해관계자", &["stakeholder"][..]),
        ];
        Self(
            groups
                .iter()
                .map(|(canonical, forms)| {
                    (
                        canonical.to_string(),
                        forms.iter().map(|f| f.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}
