//! Shared application state for the Axum server.

use std::sync::Arc;

use qm_interpreter::{
    ActionResolver, Clock, ModelResolver, RuleBasedResolver, SystemClock, TieredResolver,
};
use qm_protocol::Priority;

use crate::config::{ResolverMode, ServerConfig};
use crate::store::{NewTask, TaskStore};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The quest ledger.
    pub store: Arc<TaskStore>,
    /// NL interpretation strategy behind `/api/chat`.
    pub resolver: Arc<dyn ActionResolver>,
    /// Source of "today" for filters and relative dates.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Empty ledger, rule-based resolver, system clock.
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_resolver(
            Arc::new(RuleBasedResolver::with_clock(clock.clone())),
            clock,
        )
    }

    /// Empty ledger with an explicit resolver and clock.
    pub fn with_resolver(resolver: Arc<dyn ActionResolver>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(TaskStore::new()),
            resolver,
            clock,
        }
    }

    /// Build state for the configured resolver mode.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let rules = || RuleBasedResolver::with_clock(clock.clone());

        let resolver: Arc<dyn ActionResolver> = match config.effective_resolver() {
            ResolverMode::Rules => Arc::new(rules()),
            ResolverMode::Model => Arc::new(ModelResolver::with_clock(
                config.model.clone(),
                clock.clone(),
            )?),
            ResolverMode::Tiered => Arc::new(TieredResolver::new(
                Box::new(rules()),
                Box::new(ModelResolver::with_clock(
                    config.model.clone(),
                    clock.clone(),
                )?),
            )),
        };

        tracing::info!(
            resolver = resolver.tier_name(),
            model = %config.model.model,
            "resolver configured"
        );
        Ok(Self::with_resolver(resolver, clock))
    }

    /// Seed a few quests so a fresh server has something to show.
    pub async fn seed_sample_data(&self) -> anyhow::Result<()> {
        for (description, priority) in [
            ("Slay the goblin king", Priority::High),
            ("Restock healing potions", Priority::Medium),
            ("Polish the ancestral shield", Priority::Low),
        ] {
            self.store
                .create(NewTask {
                    description: description.to_string(),
                    priority,
                    due_date: None,
                })
                .await?;
        }
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
