//! Model-delegated resolver over an Ollama-compatible `/api/chat` API.
//!
//! The model sees the numbered ledger and the current date, and must
//! answer with a single JSON action. The answer is validated into exactly
//! one [`Action`]; anything else (unreachable host, timeout, garbage,
//! unknown action, quest number outside the ledger) is logged and treated
//! as an unrecognized command.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use qm_protocol::{Action, Priority, Resolution, ResolverTier, ShowFilter, TaskSnapshot};
use serde::{Deserialize, Serialize};

use super::ActionResolver;
use crate::clock::{Clock, SystemClock};
use crate::error::{InterpretError, InterpretResult};
use crate::position::resolve_position;

const SYSTEM_PROMPT: &str = r#"You are the sentient consciousness of an ancient dungeon, serving as the Dungeon Task Master. You manage quests (tasks) for adventurers.

Translate the adventurer's message into exactly one action on the quest ledger.

Available actions:
- "add": inscribe a new quest. Requires "description". Optional "priority".
- "complete": vanquish a quest. Requires "quest".
- "delete": erase a quest from history. Requires "quest".
- "set_priority": requires "quest" and "priority".
- "set_due_date": requires "quest". "due_date" is "YYYY-MM-DD", or null to remove the time constraint.
- "show": display quests. Optional "filter": "all", "high" (urgent quests) or "today" (due today).
- "chat": the message is not a command; just reply.

"quest" is the quest's number in the ledger listing below, starting at 1.
"priority" is one of "low" (minor), "medium" (common), "high" (urgent).

Respond with ONLY a JSON object (no markdown, no explanation):
{"action": "<action>", "quest": <number>, "description": "...", "priority": "...", "due_date": "...", "filter": "...", "reply": "<short dungeon-themed reply in the adventurer's language>"}

Omit fields the action does not use."#;

/// Configuration for the model-delegated resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Chat API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Model to ask.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether the model may be consulted at all.
    #[serde(default)]
    pub enabled: bool,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "phi3:mini".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            enabled: false,
        }
    }
}

/// Chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Raw model output before validation.
#[derive(Debug, Default, Deserialize)]
struct RawAction {
    action: Option<String>,
    quest: Option<u64>,
    description: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
    filter: Option<String>,
    reply: Option<String>,
}

/// Why a model answer was thrown away.
#[derive(Debug, thiserror::Error)]
enum Rejection {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("response carried no message")]
    NoMessage,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no action named")]
    NoAction,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("'{0}' is missing")]
    Missing(&'static str),
    #[error("bad priority '{0}'")]
    BadPriority(String),
    #[error("bad due date '{0}'")]
    BadDate(String),
    #[error("quest {0} is not in the ledger")]
    UnknownQuest(u64),
}

/// Resolver that asks a conversational model.
pub struct ModelResolver {
    client: reqwest::Client,
    config: ModelConfig,
    clock: Arc<dyn Clock>,
}

impl ModelResolver {
    pub fn new(config: ModelConfig) -> Result<Self, reqwest::Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ModelConfig, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            clock,
        })
    }

    async fn ask(&self, utterance: &str, snapshot: &TaskSnapshot) -> Result<Resolution, Rejection> {
        let today = self.clock.today();
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let system = system_prompt(snapshot, today);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: utterance,
                },
            ],
            format: "json",
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Rejection::Status(response.status()));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat.message.ok_or(Rejection::NoMessage)?.content;
        let raw: RawAction = serde_json::from_str(extract_json(&content))?;
        let reply = raw.reply.clone().filter(|r| !r.trim().is_empty());
        let action = validate(raw, snapshot)?;

        Ok(Resolution {
            action,
            tier: ResolverTier::Model,
            reply,
        })
    }
}

#[async_trait]
impl ActionResolver for ModelResolver {
    async fn resolve(
        &self,
        utterance: &str,
        snapshot: &TaskSnapshot,
    ) -> InterpretResult<Resolution> {
        match self.ask(utterance, snapshot).await {
            Ok(resolution) => {
                tracing::info!(action = resolution.action.name(), "model resolved utterance");
                Ok(resolution)
            }
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model, "model resolution rejected");
                Err(InterpretError::UnrecognizedCommand)
            }
        }
    }

    fn tier_name(&self) -> &str {
        "model"
    }
}

/// System prompt with the date context and the numbered ledger.
fn system_prompt(snapshot: &TaskSnapshot, today: NaiveDate) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Current date: {today}");
    if let Some(tomorrow) = today.checked_add_days(Days::new(1)) {
        let _ = writeln!(prompt, "Tomorrow's date: {tomorrow}");
    }
    prompt.push('\n');
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\nQuest ledger:\n");
    if snapshot.is_empty() {
        prompt.push_str("(empty)\n");
    }
    for (i, task) in snapshot.iter().enumerate() {
        let due = task
            .due_date
            .map_or_else(|| "no time constraint".to_string(), |d| format!("due {d}"));
        let state = if task.completed { ", vanquished" } else { "" };
        let _ = writeln!(
            prompt,
            "{}. {} ({} priority, {}{})",
            i + 1,
            task.description,
            task.priority,
            due,
            state
        );
    }
    prompt
}

/// Turn raw model output into one fully-populated action.
fn validate(raw: RawAction, snapshot: &TaskSnapshot) -> Result<Action, Rejection> {
    let name = raw.action.ok_or(Rejection::NoAction)?;
    let target = |quest: Option<u64>| {
        let n = quest.ok_or(Rejection::Missing("quest"))?;
        resolve_position(n, snapshot).ok_or(Rejection::UnknownQuest(n))
    };
    let priority = |p: Option<String>| -> Result<Option<Priority>, Rejection> {
        p.map(|s| s.parse::<Priority>().map_err(|_| Rejection::BadPriority(s)))
            .transpose()
    };

    let action = match name.trim().to_ascii_lowercase().as_str() {
        "add" => {
            let description = raw
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .ok_or(Rejection::Missing("description"))?;
            Action::AddTask {
                description,
                priority: priority(raw.priority)?.unwrap_or_default(),
            }
        }
        "complete" => Action::CompleteTask {
            task_id: target(raw.quest)?,
        },
        "delete" => Action::DeleteTask {
            task_id: target(raw.quest)?,
        },
        "set_priority" => Action::SetPriority {
            task_id: target(raw.quest)?,
            priority: priority(raw.priority)?.ok_or(Rejection::Missing("priority"))?,
        },
        "set_due_date" => {
            let task_id = target(raw.quest)?;
            let due_date = match raw.due_date.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(s) => Some(
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .map_err(|_| Rejection::BadDate(s.to_string()))?,
                ),
            };
            Action::SetDueDate { task_id, due_date }
        }
        "show" => Action::ShowTasks {
            filter: Some(parse_filter(raw.filter.as_deref())),
        },
        "chat" => Action::Chat {},
        other => return Err(Rejection::UnknownAction(other.to_string())),
    };
    Ok(action)
}

/// Unknown filter names fall back to the full ledger.
fn parse_filter(filter: Option<&str>) -> ShowFilter {
    match filter.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
        Some("high") | Some("urgent") => ShowFilter::High,
        Some("today") => ShowFilter::Today,
        _ => ShowFilter::All,
    }
}

/// Extract JSON from model output that may be wrapped in markdown fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use qm_protocol::{Task, TaskId};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn ledger() -> TaskSnapshot {
        TaskSnapshot::new(vec![
            Task::new(TaskId(9), "defeat the dragon", Priority::High),
            Task::new(TaskId(42), "feed the griffin", Priority::Low),
        ])
    }

    /// Build a chat API response body.
    fn chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "phi3:mini",
            "message": { "role": "assistant", "content": content },
            "done": true
        })
    }

    fn resolver_for(server: &MockServer) -> ModelResolver {
        ModelResolver::with_clock(
            ModelConfig {
                host: server.uri(),
                model: "phi3:mini".into(),
                timeout_secs: 2,
                enabled: true,
            },
            Arc::new(FixedClock(today())),
        )
        .unwrap()
    }

    async fn mount(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
            .mount(server)
            .await;
    }

    // ── Wire behaviour ───────────────────────────────────────────

    #[tokio::test]
    async fn resolves_quest_number_through_ledger() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains("2. feed the griffin"))
            .and(body_string_contains("Current date: 2024-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
                r#"{"action": "complete", "quest": 2, "reply": "The griffin is fed!"}"#,
            )))
            .mount(&server)
            .await;

        let res = resolver_for(&server)
            .resolve("I fed the griffin", &ledger())
            .await
            .unwrap();
        assert_eq!(res.tier, ResolverTier::Model);
        assert_eq!(
            res.action,
            Action::CompleteTask {
                task_id: TaskId(42)
            }
        );
        assert_eq!(res.reply.as_deref(), Some("The griffin is fed!"));
    }

    #[tokio::test]
    async fn chat_action() {
        let server = MockServer::start().await;
        mount(&server, r#"{"action": "chat", "reply": "Greetings, mortal."}"#).await;

        let res = resolver_for(&server)
            .resolve("hello dungeon", &TaskSnapshot::empty())
            .await
            .unwrap();
        assert_eq!(res.action, Action::Chat {});
    }

    #[tokio::test]
    async fn out_of_range_quest_is_unrecognized() {
        let server = MockServer::start().await;
        mount(&server, r#"{"action": "delete", "quest": 7}"#).await;

        let err = resolver_for(&server)
            .resolve("erase the seventh", &ledger())
            .await
            .unwrap_err();
        assert_eq!(err, InterpretError::UnrecognizedCommand);
    }

    #[tokio::test]
    async fn invalid_json_is_unrecognized() {
        let server = MockServer::start().await;
        mount(&server, "the runes are unclear").await;

        let result = resolver_for(&server).resolve("add stuff", &ledger()).await;
        assert_eq!(result, Err(InterpretError::UnrecognizedCommand));
    }

    #[tokio::test]
    async fn server_error_is_unrecognized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = resolver_for(&server).resolve("show", &ledger()).await;
        assert_eq!(result, Err(InterpretError::UnrecognizedCommand));
    }

    #[tokio::test]
    async fn timeout_is_unrecognized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response(r#"{"action": "show"}"#))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        // Client timeout is 2s, mock delays 10s
        let result = resolver_for(&server).resolve("show", &ledger()).await;
        assert_eq!(result, Err(InterpretError::UnrecognizedCommand));
    }

    // ── Validation ───────────────────────────────────────────────

    fn raw(json: &str) -> RawAction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn validate_add() {
        let action = validate(
            raw(r#"{"action": "add", "description": "  slay the troll ", "priority": "HIGH"}"#),
            &ledger(),
        )
        .unwrap();
        assert_eq!(
            action,
            Action::AddTask {
                description: "slay the troll".into(),
                priority: Priority::High
            }
        );

        let action = validate(raw(r#"{"action": "add", "description": "x"}"#), &ledger()).unwrap();
        assert!(matches!(
            action,
            Action::AddTask {
                priority: Priority::Medium,
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_incomplete_actions() {
        let snap = ledger();
        assert!(matches!(
            validate(raw(r#"{"action": "add", "description": "  "}"#), &snap),
            Err(Rejection::Missing("description"))
        ));
        assert!(matches!(
            validate(raw(r#"{"action": "set_priority", "quest": 1}"#), &snap),
            Err(Rejection::Missing("priority"))
        ));
        assert!(matches!(
            validate(raw(r#"{"action": "set_priority", "quest": 1, "priority": "urgent"}"#), &snap),
            Err(Rejection::BadPriority(_))
        ));
        assert!(matches!(
            validate(raw(r#"{"action": "complete"}"#), &snap),
            Err(Rejection::Missing("quest"))
        ));
        assert!(matches!(
            validate(raw(r#"{"action": "dance"}"#), &snap),
            Err(Rejection::UnknownAction(_))
        ));
        assert!(matches!(
            validate(raw(r#"{"reply": "hmm"}"#), &snap),
            Err(Rejection::NoAction)
        ));
    }

    #[test]
    fn validate_due_dates() {
        let snap = ledger();
        assert_eq!(
            validate(
                raw(r#"{"action": "set_due_date", "quest": 1, "due_date": "2024-06-09"}"#),
                &snap
            )
            .unwrap(),
            Action::SetDueDate {
                task_id: TaskId(9),
                due_date: NaiveDate::from_ymd_opt(2024, 6, 9)
            }
        );
        assert_eq!(
            validate(
                raw(r#"{"action": "set_due_date", "quest": 2, "due_date": null}"#),
                &snap
            )
            .unwrap(),
            Action::SetDueDate {
                task_id: TaskId(42),
                due_date: None
            }
        );
        assert!(matches!(
            validate(
                raw(r#"{"action": "set_due_date", "quest": 2, "due_date": "next moon"}"#),
                &snap
            ),
            Err(Rejection::BadDate(_))
        ));
    }

    #[test]
    fn validate_show_filters() {
        let snap = TaskSnapshot::empty();
        let show = |json: &str| validate(raw(json), &snap).unwrap();
        assert_eq!(
            show(r#"{"action": "show", "filter": "urgent"}"#),
            Action::ShowTasks {
                filter: Some(ShowFilter::High)
            }
        );
        assert_eq!(
            show(r#"{"action": "show", "filter": "pending"}"#),
            Action::ShowTasks {
                filter: Some(ShowFilter::All)
            }
        );
    }

    // ── Prompt & helpers ─────────────────────────────────────────

    #[test]
    fn prompt_lists_ledger_in_order() {
        let prompt = system_prompt(&ledger(), today());
        assert!(prompt.contains("Tomorrow's date: 2024-06-02"));
        let first = prompt.find("1. defeat the dragon (high priority").unwrap();
        let second = prompt.find("2. feed the griffin (low priority").unwrap();
        assert!(first < second);
        assert!(system_prompt(&TaskSnapshot::empty(), today()).contains("(empty)"));
    }

    #[test]
    fn extract_json_variants() {
        let raw = r#"{"action": "show"}"#;
        assert_eq!(extract_json(raw), raw);
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("Behold:\n```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
    }

    #[test]
    fn config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "phi3:mini");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.enabled);
    }

    #[test]
    fn config_from_toml() {
        let config: ModelConfig = toml::from_str(
            r#"
host = "http://10.0.0.5:11434"
model = "gemma:2b"
enabled = true
"#,
        )
        .unwrap();
        assert_eq!(config.host, "http://10.0.0.5:11434");
        assert_eq!(config.model, "gemma:2b");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.enabled);
    }
}
