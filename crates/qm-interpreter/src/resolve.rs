//! Rule-based action resolution.
//!
//! Given the classified intent, the raw utterance and the snapshot, apply
//! the intent-specific extraction rules and build a fully-typed [`Action`]
//! or fail with an [`InterpretError`]. Nothing here performs I/O.

use chrono::NaiveDate;
use qm_protocol::{Action, Priority, ShowFilter, TaskId, TaskSnapshot};

use crate::classify::{Intent, classify};
use crate::error::{InterpretError, InterpretResult, TargetMiss};
use crate::lexical::{
    extract_date, extract_ordinal, extract_priority, has_date_cue, is_priority_word,
    mentions_stem, mentions_word, normalize_word,
};
use crate::position::resolve_position;

/// Words that introduce a description without being part of it
/// ("create a new quest: ...", "add urgent ...").
const LEADING_FILLER: &[&str] = &[
    "add", "create", "new", "quest", "task", "called", "named", "titled", "priority", "please",
];

/// Articles only dropped when they precede other leading filler.
const LEADING_ARTICLES: &[&str] = &["a", "an"];

/// Phrases that end a description; everything from them on is dropped
/// ("... to my list tonight").
const CUT_PHRASES: &[&[&str]] = &[&["to", "my"], &["to", "the"], &["list"], &["please"]];

/// Words trailing a description ("... quest ledger").
const TRAILING_FILLER: &[&str] = &[
    "priority", "to", "my", "the", "list", "please", "quest", "quests", "ledger",
];

/// Stems that select the due-date branch of a modify command.
const DATE_FIELD_STEMS: &[&str] = &["date", "due", "time"];

/// Interpret one utterance against the ledger as displayed.
///
/// `today` anchors relative dates ("today", "tomorrow").
pub fn interpret(
    utterance: &str,
    snapshot: &TaskSnapshot,
    today: NaiveDate,
) -> InterpretResult<Action> {
    let intent = classify(utterance)?;
    tracing::debug!(?intent, tasks = snapshot.len(), "utterance classified");
    resolve_action(intent, utterance, snapshot, today)
}

/// Build the action for an already-classified intent.
pub fn resolve_action(
    intent: Intent,
    utterance: &str,
    snapshot: &TaskSnapshot,
    today: NaiveDate,
) -> InterpretResult<Action> {
    let lower = utterance.to_lowercase();
    match intent {
        Intent::Add => resolve_add(utterance),
        Intent::Modify => resolve_modify(&lower, snapshot, today),
        Intent::Show => Ok(Action::ShowTasks {
            filter: Some(show_filter(&lower)),
        }),
        Intent::Complete => {
            let task_id = target(&lower, snapshot).ok_or(unresolved(TargetMiss::Quest))?;
            Ok(Action::CompleteTask { task_id })
        }
        Intent::Delete => {
            let task_id = target(&lower, snapshot).ok_or(unresolved(TargetMiss::Quest))?;
            Ok(Action::DeleteTask { task_id })
        }
    }
}

fn unresolved(miss: TargetMiss) -> InterpretError {
    InterpretError::UnresolvedTarget(miss)
}

/// Ordinal in the text resolved against the snapshot.
fn target(text: &str, snapshot: &TaskSnapshot) -> Option<TaskId> {
    extract_ordinal(text).and_then(|n| resolve_position(n, snapshot))
}

// ── Add ─────────────────────────────────────────────────────────

fn resolve_add(utterance: &str) -> InterpretResult<Action> {
    let priority = extract_priority(utterance).unwrap_or_default();
    let description = add_description(utterance);
    if description.is_empty() {
        return Err(InterpretError::EmptyDescription);
    }
    Ok(Action::AddTask {
        description,
        priority,
    })
}

/// Pull the quest description out of an add command, keeping the
/// adventurer's own casing.
///
/// The description starts after the word "add" (or a word stemmed on it,
/// or the create/new keyword when neither is present), skips leading
/// filler, stops at the first priority cue or filler phrase and sheds
/// trailing filler.
fn add_description(utterance: &str) -> String {
    let tokens: Vec<&str> = utterance.split_whitespace().collect();
    let normalized: Vec<String> = tokens.iter().map(|t| normalize_word(t)).collect();

    let anchor = normalized
        .iter()
        .position(|w| w == "add")
        .or_else(|| normalized.iter().position(|w| w.starts_with("add")))
        .or_else(|| {
            normalized
                .iter()
                .position(|w| w.starts_with("create") || w.starts_with("new"))
        });
    let mut start = anchor.map_or(0, |i| i + 1);

    // Leading filler: "a new quest called ...", "urgent: ..."
    while start < tokens.len() {
        let word = normalized[start].as_str();
        let next_is_filler = normalized
            .get(start + 1)
            .is_some_and(|n| is_leading_filler(n));
        if word.is_empty()
            || is_leading_filler(word)
            || (LEADING_ARTICLES.contains(&word) && next_is_filler)
        {
            start += 1;
        } else {
            break;
        }
    }

    // Everything from the first priority cue or filler phrase onward is
    // modifier talk.
    let end = (start..tokens.len())
        .find(|&i| is_priority_cue(&normalized[i]) || starts_cut_phrase(&normalized[i..]))
        .unwrap_or(tokens.len());

    let mut end = end;
    while end > start && is_trailing_filler(&normalized[end - 1]) {
        end -= 1;
    }

    tokens[start..end]
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim()
        .to_string()
}

fn is_priority_cue(word: &str) -> bool {
    word == "priority" || is_priority_word(word)
}

fn starts_cut_phrase(words: &[String]) -> bool {
    CUT_PHRASES.iter().any(|phrase| {
        phrase.len() <= words.len() && phrase.iter().zip(words).all(|(p, w)| *p == w.as_str())
    })
}

fn is_leading_filler(word: &str) -> bool {
    LEADING_FILLER.contains(&word) || is_priority_word(word)
}

fn is_trailing_filler(word: &str) -> bool {
    word.is_empty() || TRAILING_FILLER.contains(&word)
}

// ── Modify ──────────────────────────────────────────────────────

/// Which field a modify command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyField {
    Priority,
    DueDate,
}

/// "priority" names the field outright; date/due/time likewise. Failing
/// both, a bare priority synonym or date cue implies the field
/// ("set quest 1 to urgent", "move quest 2 to tomorrow").
fn modify_field(lower: &str) -> Option<ModifyField> {
    if mentions_word(lower, &["priority"]) {
        Some(ModifyField::Priority)
    } else if mentions_stem(lower, DATE_FIELD_STEMS) {
        Some(ModifyField::DueDate)
    } else if extract_priority(lower).is_some() {
        Some(ModifyField::Priority)
    } else if has_date_cue(lower) {
        Some(ModifyField::DueDate)
    } else {
        None
    }
}

fn resolve_modify(
    lower: &str,
    snapshot: &TaskSnapshot,
    today: NaiveDate,
) -> InterpretResult<Action> {
    match modify_field(lower).ok_or(InterpretError::MissingModifier)? {
        ModifyField::Priority => {
            let task_id = target(lower, snapshot);
            let priority: Option<Priority> = extract_priority(lower);
            match (task_id, priority) {
                (Some(task_id), Some(priority)) => Ok(Action::SetPriority { task_id, priority }),
                _ => Err(unresolved(TargetMiss::Priority)),
            }
        }
        ModifyField::DueDate => {
            let task_id = target(lower, snapshot).ok_or(unresolved(TargetMiss::DueDate))?;
            // No recognizable date clears the constraint.
            let due_date = extract_date(lower, today);
            Ok(Action::SetDueDate { task_id, due_date })
        }
    }
}

// ── Show ────────────────────────────────────────────────────────

fn show_filter(lower: &str) -> ShowFilter {
    if mentions_word(lower, &["high", "urgent"]) {
        ShowFilter::High
    } else if mentions_stem(lower, &["today", "tomorrow"])
        || mentions_word(lower, &["due", "date", "deadline"])
    {
        ShowFilter::Today
    } else {
        ShowFilter::All
    }
}
