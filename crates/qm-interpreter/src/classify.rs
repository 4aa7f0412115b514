//! Intent classification by keyword family.

use crate::error::{InterpretError, InterpretResult};
use crate::lexical::mentions_stem;

/// Candidate intent selected from the utterance's keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Add,
    /// Change priority or due date; disambiguated during resolution.
    Modify,
    Show,
    Complete,
    Delete,
}

/// Keyword families in precedence order. First family with a match wins.
const FAMILIES: &[(&[&str], Intent)] = &[
    (&["add", "create", "new"], Intent::Add),
    (&["change", "set", "update"], Intent::Modify),
    (&["show", "view", "what", "get", "list"], Intent::Show),
    (&["complete", "done", "finish"], Intent::Complete),
    (&["delete", "remove", "erase"], Intent::Delete),
];

/// Pick the intent family for an utterance.
///
/// An utterance naming words from several families resolves by the fixed
/// precedence order, never by scoring.
pub fn classify(utterance: &str) -> InterpretResult<Intent> {
    let lower = utterance.to_lowercase();
    FAMILIES
        .iter()
        .find(|(stems, _)| mentions_stem(&lower, stems))
        .map(|(_, intent)| *intent)
        .ok_or(InterpretError::UnrecognizedCommand)
}
