//! Dungeon-voiced replies for executed actions.

use chrono::NaiveDate;
use qm_protocol::{Priority, ShowFilter};

use crate::executor::Outcome;

/// Word the dungeon uses for a priority.
pub fn priority_word(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "urgent",
        Priority::Medium => "common",
        Priority::Low => "minor",
    }
}

/// "Jun 1, 2024".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Reply for an executed action.
pub fn reply(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Added(_) => "Quest inscribed in the eternal ledger.".to_string(),
        Outcome::Completed(task) => format!("Quest #{} has been vanquished!", task.id),
        Outcome::Deleted(task) => format!("Quest #{} has been erased from history.", task.id),
        Outcome::PriorityChanged(task) => format!(
            "Quest #{} is now marked as {}.",
            task.id,
            priority_word(task.priority)
        ),
        Outcome::DueDateChanged(task) => {
            let when = task
                .due_date
                .map(format_date)
                .unwrap_or_else(|| "no time constraint".to_string());
            format!("Quest #{} now has {when}.", task.id)
        }
        Outcome::Shown { count: 0, .. } => "The ledger is empty... no quests await.".to_string(),
        Outcome::Shown { filter, count } => {
            let noun = if *count == 1 { "quest" } else { "quests" };
            match filter {
                ShowFilter::All => format!("Your quests await your attention, adventurer. {count} {noun} in the ledger."),
                ShowFilter::High => format!("{count} urgent {noun} demand your blade."),
                ShowFilter::Today => format!("{count} {noun} must be vanquished before nightfall."),
            }
        }
        Outcome::Chatted => "The dungeon listens... speak your command, mortal.".to_string(),
    }
}
