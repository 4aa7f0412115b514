//! Tiered resolver: rules first, model fallback.
//!
//! The model is consulted only when the rules do not recognize the
//! command at all. If the model misses too, the rule-based diagnostic is
//! what the adventurer sees.

use async_trait::async_trait;
use qm_protocol::{Resolution, TaskSnapshot};

use super::ActionResolver;
use crate::error::InterpretResult;

/// Composite resolver that tries the local rules, then the model.
pub struct TieredResolver {
    rules: Box<dyn ActionResolver>,
    model: Box<dyn ActionResolver>,
}

impl TieredResolver {
    pub fn new(rules: Box<dyn ActionResolver>, model: Box<dyn ActionResolver>) -> Self {
        Self { rules, model }
    }
}

#[async_trait]
impl ActionResolver for TieredResolver {
    async fn resolve(
        &self,
        utterance: &str,
        snapshot: &TaskSnapshot,
    ) -> InterpretResult<Resolution> {
        let err = match self.rules.resolve(utterance, snapshot).await {
            Ok(resolution) => return Ok(resolution),
            Err(err) if err.is_miss() => err,
            Err(err) => return Err(err),
        };

        tracing::debug!(kind = err.kind(), "rules missed, falling back to model");
        self.model.resolve(utterance, snapshot).await.map_err(|_| err)
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}
