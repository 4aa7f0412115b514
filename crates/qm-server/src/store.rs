//! In-memory task store.
//!
//! Tasks are kept in insertion order; that order is the display order
//! ordinal references ("quest 2") resolve against. Identifiers are
//! assigned sequentially from 1 and never reused.

use chrono::NaiveDate;
use qm_protocol::{Priority, Task, TaskId, TaskSnapshot};
use thiserror::Error;
use tokio::sync::RwLock;

/// Store failures. Kept apart from interpretation failures on purpose:
/// these mean the ledger refused an otherwise well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("quest #{0} not found")]
    NotFound(TaskId),

    #[error("description cannot be empty")]
    EmptyDescription,
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a new quest.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Partial update. `None` leaves a field unchanged; for `due_date`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
}

#[derive(Debug)]
struct Ledger {
    tasks: Vec<Task>,
    next_id: u64,
}

/// Shared quest ledger.
#[derive(Debug)]
pub struct TaskStore {
    ledger: RwLock<Ledger>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            ledger: RwLock::new(Ledger {
                tasks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// All quests in display order.
    pub async fn list(&self) -> Vec<Task> {
        self.ledger.read().await.tasks.clone()
    }

    /// Ordered snapshot for interpretation.
    pub async fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::new(self.list().await)
    }

    pub async fn get(&self, id: TaskId) -> StoreResult<Task> {
        let ledger = self.ledger.read().await;
        ledger
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn create(&self, new: NewTask) -> StoreResult<Task> {
        let description = new.description.trim();
        if description.is_empty() {
            return Err(StoreError::EmptyDescription);
        }

        let mut ledger = self.ledger.write().await;
        let id = TaskId(ledger.next_id);
        ledger.next_id += 1;

        let task = Task::new(id, description, new.priority).with_due_date(new.due_date);
        ledger.tasks.push(task.clone());
        tracing::debug!(task_id = %id, "quest inscribed");
        Ok(task)
    }

    pub async fn update(&self, id: TaskId, update: TaskUpdate) -> StoreResult<Task> {
        let description = match update.description {
            Some(d) if d.trim().is_empty() => return Err(StoreError::EmptyDescription),
            Some(d) => Some(d.trim().to_string()),
            None => None,
        };

        let mut ledger = self.ledger.write().await;
        let task = ledger
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        Ok(task.clone())
    }

    /// Remove a quest, returning it.
    pub async fn delete(&self, id: TaskId) -> StoreResult<Task> {
        let mut ledger = self.ledger.write().await;
        let index = ledger
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(ledger.tasks.remove(index))
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
