//! Lexical extractors: each scans raw text for one category of fact.
//!
//! The extractors are independent of each other and of the intent; all
//! matching is case-insensitive and anchored at the start of a word.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use qm_protocol::Priority;
use regex::Regex;

static RE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

static RE_DATE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap());

/// Priority stems, checked family by family in this order.
const PRIORITY_WORDS: &[(&[&str], Priority)] = &[
    (&["high", "urgent"], Priority::High),
    (&["medium", "common"], Priority::Medium),
    (&["low", "minor"], Priority::Low),
];

/// Lowercased words with surrounding punctuation removed.
pub(crate) fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
}

/// Lowercase a single token and strip leading/trailing punctuation.
pub(crate) fn normalize_word(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Lowercased alphanumeric runs: "URGENT-quest" yields "urgent", "quest".
fn word_parts(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
}

/// True if any word in `text` starts with one of `stems`.
///
/// Stems match inflections ("completed", "deleting") but never the middle
/// of a word ("allow" does not mention "low").
pub(crate) fn mentions_stem(text: &str, stems: &[&str]) -> bool {
    words(text).any(|w| stems.iter().any(|s| w.starts_with(s)))
}

/// True if any word in `text` is exactly one of `candidates`.
pub(crate) fn mentions_word(text: &str, candidates: &[&str]) -> bool {
    words(text).any(|w| candidates.contains(&w.as_str()))
}

/// Whether `word` (already normalized) is a priority synonym.
pub(crate) fn is_priority_word(word: &str) -> bool {
    PRIORITY_WORDS
        .iter()
        .any(|(synonyms, _)| synonyms.contains(&word))
}

/// Extract a priority from synonyms in the text.
///
/// Synonyms match as stems of any word or hyphenated part ("urgently",
/// "URGENT-quest"), never inside a word ("below"). Families are tested
/// high, then medium, then low; the first family with a match wins
/// regardless of word position.
pub fn extract_priority(text: &str) -> Option<Priority> {
    let parts: Vec<String> = word_parts(text).collect();
    PRIORITY_WORDS.iter().find_map(|(stems, priority)| {
        parts
            .iter()
            .any(|p| stems.iter().any(|s| p.starts_with(s)))
            .then_some(*priority)
    })
}

/// Extract a calendar date.
///
/// "today" wins over "tomorrow", which wins over the first `YYYY-MM-DD`
/// literal. Both relative words match as stems ("tomorrow's"). A literal
/// that names no real day (2024-02-30) yields `None`.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if mentions_stem(text, &["today"]) {
        return Some(today);
    }
    if mentions_stem(text, &["tomorrow"]) {
        return today.checked_add_days(Days::new(1));
    }

    let caps = RE_DATE_LITERAL.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether the text carries anything [`extract_date`] would recognize.
pub(crate) fn has_date_cue(text: &str) -> bool {
    mentions_stem(text, &["today", "tomorrow"]) || RE_DATE_LITERAL.is_match(text)
}

/// Extract the first run of decimal digits as a 1-based position.
///
/// Runs too long for a `u64` are treated as absent.
pub fn extract_ordinal(text: &str) -> Option<u64> {
    RE_ORDINAL.find(text)?.as_str().parse().ok()
}
