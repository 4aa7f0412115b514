use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable quest identifier assigned by the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quest urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// "Urgent quest".
    High,
    /// "Common quest".
    #[default]
    Medium,
    /// "Minor quest".
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a priority string is not one of `low`, `medium`, `high`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("priority must be low, medium, or high (got '{0}')")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A quest record as held by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, immutable.
    pub id: TaskId,
    /// What the adventurer has to do. Never empty once stored.
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Optional "prophecy of completion".
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
            due_date: None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Ordered view of the ledger at interpretation time.
///
/// "Quest N" in free text always means the N-th element of this sequence,
/// never a property of the task itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSnapshot {
    tasks: Vec<Task>,
}

impl TaskSnapshot {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Zero-based access in display order.
    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}

impl From<Vec<Task>> for TaskSnapshot {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

impl<'a> IntoIterator for &'a TaskSnapshot {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.to_string().contains("urgent"));
    }

    #[test]
    fn task_json_shape() {
        let task = Task::new(TaskId(7), "slay the wyrm", Priority::Low)
            .with_due_date(NaiveDate::from_ymd_opt(2024, 6, 2));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["priority"], "low");
        assert_eq!(json["due_date"], "2024-06-02");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn task_defaults_when_fields_missing() {
        let json = r#"{"id": 3, "description": "polish the shield", "created_at": "2024-06-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.due_date.is_none());
        assert!(!task.completed);
    }

    #[test]
    fn snapshot_preserves_order() {
        let snapshot = TaskSnapshot::new(vec![
            Task::new(TaskId(9), "a", Priority::Medium),
            Task::new(TaskId(42), "b", Priority::Medium),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(1).map(|t| t.id), Some(TaskId(42)));
        assert!(snapshot.get(2).is_none());
        let ids: Vec<u64> = snapshot.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![9, 42]);
    }
}
