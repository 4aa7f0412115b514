//! Interpretation failures.
//!
//! Every variant is an expected, user-facing outcome. Its `Display` text
//! is the diagnostic shown to the adventurer verbatim.

use std::fmt;

use thiserror::Error;

/// Example commands offered when an utterance cannot be understood.
pub const GUIDANCE: &str =
    "try 'add [quest]', 'set quest 1 to urgent', 'complete quest 1', or 'delete quest 1'";

/// Which lookup failed when an ordinal reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMiss {
    /// Priority change: quest number or priority word missing.
    Priority,
    /// Due-date change: quest number missing or out of range.
    DueDate,
    /// Complete / delete: quest number missing or out of range.
    Quest,
}

impl fmt::Display for TargetMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetMiss::Priority => "cannot resolve target quest or priority",
            TargetMiss::DueDate => "cannot resolve target quest",
            TargetMiss::Quest => "quest not found, specify its number",
        })
    }
}

/// Why an utterance did not produce an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("unrecognized command: {}", GUIDANCE)]
    UnrecognizedCommand,

    #[error("empty quest description")]
    EmptyDescription,

    #[error("{0}")]
    UnresolvedTarget(TargetMiss),

    #[error("missing quest modifier: say 'priority' or 'due date', e.g. 'set quest 1 priority high'")]
    MissingModifier,
}

impl InterpretError {
    /// Stable tag for API bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InterpretError::UnrecognizedCommand => "unrecognized_command",
            InterpretError::EmptyDescription => "empty_description",
            InterpretError::UnresolvedTarget(_) => "unresolved_target",
            InterpretError::MissingModifier => "missing_modifier",
        }
    }

    /// Whether another strategy might still understand the utterance.
    ///
    /// Failures about *which quest* are final: a different parser would
    /// be guessing at the same missing number.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            InterpretError::UnrecognizedCommand | InterpretError::MissingModifier
        )
    }
}

/// Convenience alias for interpretation results.
pub type InterpretResult<T> = Result<T, InterpretError>;
