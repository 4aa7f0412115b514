use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task, TaskId};

/// Structured outcome of interpreting one utterance, ready to execute
/// against the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Inscribe a new quest in the ledger.
    AddTask {
        description: String,
        priority: Priority,
    },
    /// Mark a quest as vanquished.
    CompleteTask { task_id: TaskId },
    /// Erase a quest from history.
    DeleteTask { task_id: TaskId },
    SetPriority {
        task_id: TaskId,
        priority: Priority,
    },
    /// `due_date: None` means "no due-date constraint", not "unspecified".
    SetDueDate {
        task_id: TaskId,
        due_date: Option<NaiveDate>,
    },
    ShowTasks {
        #[serde(default)]
        filter: Option<ShowFilter>,
    },
    /// Conversational acknowledgment; touches nothing.
    Chat {},
}

impl Action {
    /// Whether executing this action changes the task store.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::ShowTasks { .. } | Action::Chat {})
    }

    /// Short name used in logs and replies.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddTask { .. } => "add_task",
            Action::CompleteTask { .. } => "complete_task",
            Action::DeleteTask { .. } => "delete_task",
            Action::SetPriority { .. } => "set_priority",
            Action::SetDueDate { .. } => "set_due_date",
            Action::ShowTasks { .. } => "show_tasks",
            Action::Chat {} => "chat",
        }
    }
}

/// Named view over the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowFilter {
    #[default]
    All,
    /// Open quests of high priority.
    High,
    /// Open quests due on the current date.
    Today,
}

impl ShowFilter {
    /// Whether `task` belongs in this view on `today`.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            ShowFilter::All => true,
            ShowFilter::High => task.priority == Priority::High && !task.completed,
            ShowFilter::Today => task.due_date == Some(today) && !task.completed,
        }
    }

    /// Apply the filter, keeping ledger order.
    pub fn apply<'a>(
        &self,
        tasks: impl IntoIterator<Item = &'a Task>,
        today: NaiveDate,
    ) -> Vec<Task> {
        tasks
            .into_iter()
            .filter(|t| self.matches(t, today))
            .cloned()
            .collect()
    }
}

/// Which resolution strategy produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverTier {
    /// Keyword rules, no I/O.
    Rules,
    /// Delegated to a conversational model.
    Model,
}

/// A successfully resolved utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub action: Action,
    pub tier: ResolverTier,
    /// Free-text reply offered by the model tier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl Resolution {
    pub fn rules(action: Action) -> Self {
        Self {
            action,
            tier: ResolverTier::Rules,
            reply: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn action_tagged_serialization() {
        let action = Action::SetPriority {
            task_id: TaskId(42),
            priority: Priority::High,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "set_priority");
        assert_eq!(json["task_id"], 42);
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn chat_and_show_serialization() {
        let json = serde_json::to_string(&Action::Chat {}).unwrap();
        assert_eq!(json, r#"{"action":"chat"}"#);

        let show: Action = serde_json::from_str(r#"{"action":"show_tasks"}"#).unwrap();
        assert_eq!(show, Action::ShowTasks { filter: None });
    }

    #[test]
    fn set_due_date_null_clears() {
        let action: Action =
            serde_json::from_str(r#"{"action":"set_due_date","task_id":3,"due_date":null}"#)
                .unwrap();
        assert_eq!(
            action,
            Action::SetDueDate {
                task_id: TaskId(3),
                due_date: None
            }
        );
    }

    #[test]
    fn mutating_actions() {
        assert!(Action::DeleteTask { task_id: TaskId(1) }.is_mutating());
        assert!(!Action::ShowTasks { filter: None }.is_mutating());
        assert!(!Action::Chat {}.is_mutating());
    }

    #[test]
    fn filters_skip_completed_quests() {
        let today = date(2024, 6, 1);
        let mut urgent = Task::new(TaskId(1), "storm the keep", Priority::High);
        let due = Task::new(TaskId(2), "feed the griffin", Priority::Low)
            .with_due_date(Some(today));
        let later = Task::new(TaskId(3), "map the caves", Priority::High)
            .with_due_date(Some(date(2024, 6, 9)));

        assert!(ShowFilter::High.matches(&urgent, today));
        assert!(ShowFilter::Today.matches(&due, today));
        assert!(!ShowFilter::Today.matches(&later, today));

        urgent.completed = true;
        assert!(!ShowFilter::High.matches(&urgent, today));
        assert!(ShowFilter::All.matches(&urgent, today));

        let tasks = [urgent, due, later];
        let high: Vec<u64> = ShowFilter::High
            .apply(&tasks, today)
            .iter()
            .map(|t| t.id.0)
            .collect();
        assert_eq!(high, vec![3]);
    }

    #[test]
    fn resolver_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&ResolverTier::Model).unwrap(),
            r#""model""#
        );
        let res = Resolution::rules(Action::Chat {});
        let json = serde_json::to_string(&res).unwrap();
        assert!(!json.contains("reply"));
    }
}
