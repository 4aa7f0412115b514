//! Action executor: applies an interpreted action to the task store.
//!
//! The interpreter never touches the store; this is the only place an
//! [`Action`] becomes a mutation.

use chrono::NaiveDate;
use qm_protocol::{Action, ShowFilter, Task};

use crate::store::{NewTask, StoreResult, TaskStore, TaskUpdate};

/// What executing an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Task),
    Completed(Task),
    Deleted(Task),
    PriorityChanged(Task),
    DueDateChanged(Task),
    Shown { filter: ShowFilter, count: usize },
    Chatted,
}

/// Outcome plus the ledger view to render afterwards.
#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: Outcome,
    /// Full ledger after a mutation, or the filtered view for `ShowTasks`.
    pub tasks: Vec<Task>,
}

/// Execute `action` against `store`. `today` anchors the "today" filter.
pub async fn execute(action: &Action, store: &TaskStore, today: NaiveDate) -> StoreResult<Execution> {
    let outcome = match action {
        Action::AddTask {
            description,
            priority,
        } => Outcome::Added(
            store
                .create(NewTask {
                    description: description.clone(),
                    priority: *priority,
                    due_date: None,
                })
                .await?,
        ),
        Action::CompleteTask { task_id } => Outcome::Completed(
            store
                .update(
                    *task_id,
                    TaskUpdate {
                        completed: Some(true),
                        ..Default::default()
                    },
                )
                .await?,
        ),
        Action::DeleteTask { task_id } => Outcome::Deleted(store.delete(*task_id).await?),
        Action::SetPriority { task_id, priority } => Outcome::PriorityChanged(
            store
                .update(
                    *task_id,
                    TaskUpdate {
                        priority: Some(*priority),
                        ..Default::default()
                    },
                )
                .await?,
        ),
        Action::SetDueDate { task_id, due_date } => Outcome::DueDateChanged(
            store
                .update(
                    *task_id,
                    TaskUpdate {
                        due_date: Some(*due_date),
                        ..Default::default()
                    },
                )
                .await?,
        ),
        Action::ShowTasks { filter } => {
            let filter = filter.unwrap_or_default();
            let tasks = filter.apply(&store.list().await, today);
            tracing::debug!(?filter, count = tasks.len(), "quests shown");
            return Ok(Execution {
                outcome: Outcome::Shown {
                    filter,
                    count: tasks.len(),
                },
                tasks,
            });
        }
        Action::Chat {} => Outcome::Chatted,
    };

    tracing::info!(action = action.name(), "action executed");
    Ok(Execution {
        outcome,
        tasks: store.list().await,
    })
}
