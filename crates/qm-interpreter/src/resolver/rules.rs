//! Rule-based resolver: the pure interpreter behind the strategy trait.

use std::sync::Arc;

use async_trait::async_trait;
use qm_protocol::{Resolution, TaskSnapshot};

use super::ActionResolver;
use crate::clock::{Clock, SystemClock};
use crate::error::InterpretResult;
use crate::resolve::interpret;

/// Keyword-rule resolver. Never suspends and never touches the network.
pub struct RuleBasedResolver {
    clock: Arc<dyn Clock>,
}

impl RuleBasedResolver {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for RuleBasedResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionResolver for RuleBasedResolver {
    async fn resolve(
        &self,
        utterance: &str,
        snapshot: &TaskSnapshot,
    ) -> InterpretResult<Resolution> {
        interpret(utterance, snapshot, self.clock.today()).map(Resolution::rules)
    }

    fn tier_name(&self) -> &str {
        "rules"
    }
}
