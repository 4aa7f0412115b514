//! Shared test harness for E2E integration tests.
//!
//! Drives the real router, resolver, executor and store through HTTP
//! requests sent with `tower::oneshot`. The clock is pinned so relative
//! dates and the "today" filter are deterministic.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use qm_interpreter::{ActionResolver, Clock, FixedClock, RuleBasedResolver};
use qm_server::routes::build_router;
use qm_server::state::AppState;

/// The harness's "today".
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(today()))
}

/// End-to-end harness over the quest server.
pub struct TestHarness {
    pub state: AppState,
    pub router: Router,
}

impl TestHarness {
    /// Empty ledger, rule-based resolver.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(RuleBasedResolver::with_clock(clock())))
    }

    /// Empty ledger with a custom resolver.
    pub fn with_resolver(resolver: Arc<dyn ActionResolver>) -> Self {
        let state = AppState::with_resolver(resolver, clock());
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Rule-based harness seeded with the three sample quests.
    pub async fn with_sample_data() -> Self {
        let h = Self::new();
        h.state.seed_sample_data().await.unwrap();
        h
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// POST /api/chat.
    pub async fn chat(&self, message: &str) -> (StatusCode, Value) {
        self.send_json("POST", "/api/chat", json!({ "message": message }))
            .await
    }

    /// GET /api/tasks, optionally filtered.
    pub async fn list_tasks(&self, filter: Option<&str>) -> (StatusCode, Value) {
        let uri = match filter {
            Some(f) => format!("/api/tasks?filter={f}"),
            None => "/api/tasks".to_string(),
        };
        self.send(Request::get(&uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST /api/tasks.
    pub async fn create_task(&self, body: Value) -> (StatusCode, Value) {
        self.send_json("POST", "/api/tasks", body).await
    }

    /// PUT /api/tasks/{id}.
    pub async fn update_task(&self, id: u64, body: Value) -> (StatusCode, Value) {
        self.send_json("PUT", &format!("/api/tasks/{id}"), body)
            .await
    }

    /// DELETE /api/tasks/{id}.
    pub async fn delete_task(&self, id: u64) -> (StatusCode, Value) {
        self.send(
            Request::delete(format!("/api/tasks/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Descriptions currently in the ledger, in display order.
    pub async fn descriptions(&self) -> Vec<String> {
        self.state
            .store
            .list()
            .await
            .into_iter()
            .map(|t| t.description)
            .collect()
    }
}
