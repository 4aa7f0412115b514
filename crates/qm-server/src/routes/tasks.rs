//! Direct quest ledger endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate};
use qm_protocol::{Priority, ShowFilter, Task, TaskId};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{NewTask, TaskUpdate};

/// Query string for listing quests.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: Option<ShowFilter>,
}

/// Request body for inscribing a quest.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    /// "low", "medium" or "high". Defaults to medium.
    #[serde(default)]
    pub priority: Option<String>,
    /// ISO date. Unparseable values are stored as no due date.
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Partial update body. An explicit `"due_date": null` clears the date.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_priority(raw: &str) -> ApiResult<Priority> {
    raw.parse::<Priority>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Lenient date parsing: `YYYY-MM-DD` or an RFC 3339 timestamp.
fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// GET /api/tasks: quests in display order, optionally filtered.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let tasks = state.store.list().await;
    let tasks: Vec<Task> = match query.filter {
        Some(filter) => filter.apply(&tasks, state.clock.today()),
        None => tasks,
    };
    Json(json!({ "tasks": tasks }))
}

/// POST /api/tasks: inscribe a quest.
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let priority = match req.priority.as_deref() {
        Some(raw) => parse_priority(raw)?,
        None => Priority::default(),
    };
    let due_date = req.due_date.as_deref().and_then(parse_due_date);

    let task = state
        .store
        .create(NewTask {
            description: req.description,
            priority,
            due_date,
        })
        .await?;

    tracing::info!(task_id = %task.id, priority = %task.priority, "quest inscribed");
    Ok((StatusCode::CREATED, Json(json!({ "task": task }))))
}

/// PUT /api/tasks/{id}: partial update.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Value>> {
    let priority = req.priority.as_deref().map(parse_priority).transpose()?;
    let due_date = req
        .due_date
        .map(|raw| raw.as_deref().and_then(parse_due_date));

    let task = state
        .store
        .update(
            TaskId(id),
            TaskUpdate {
                description: req.description,
                priority,
                due_date,
                completed: req.completed,
            },
        )
        .await?;

    tracing::info!(task_id = %task.id, "quest updated");
    Ok(Json(json!({ "task": task })))
}

/// DELETE /api/tasks/{id}: erase a quest.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let task = state.store.delete(TaskId(id)).await?;
    tracing::info!(task_id = %task.id, "quest erased");
    Ok(Json(json!({ "result": true })))
}
