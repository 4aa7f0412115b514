//! Natural-language chat endpoint.
//!
//! Snapshot the ledger, let the configured resolver pick one action,
//! execute it, and answer in the dungeon's voice.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::executor::execute;
use crate::flavor;
use crate::state::AppState;

/// Request body for a chat utterance.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat: interpret and execute one utterance.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<Value>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("the dungeon heard only silence".into()));
    }

    let snapshot = state.store.snapshot().await;
    let resolution = match state.resolver.resolve(message, &snapshot).await {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::info!(
                kind = err.kind(),
                resolver = state.resolver.tier_name(),
                "utterance not understood"
            );
            return Err(err.into());
        }
    };

    let execution = execute(&resolution.action, &state.store, state.clock.today()).await?;
    let reply = resolution
        .reply
        .unwrap_or_else(|| flavor::reply(&execution.outcome));

    tracing::info!(
        action = resolution.action.name(),
        tier = ?resolution.tier,
        "chat command executed"
    );

    Ok(Json(json!({
        "action": resolution.action,
        "tier": resolution.tier,
        "reply": reply,
        "tasks": execution.tasks,
    })))
}
