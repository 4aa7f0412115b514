//! Resolution strategies behind one interface.
//!
//! Every strategy honors the same contract: one utterance plus one
//! snapshot in, exactly one [`Resolution`] or one [`InterpretError`] out.
//!
//! - **Rules** (local): keyword families and lexical extractors, no I/O.
//! - **Model**: delegates to an Ollama-compatible chat endpoint and
//!   validates the answer into an action.
//! - **Tiered**: rules first, model only when the rules do not recognize
//!   the command.

pub mod model;
pub mod rules;
pub mod tiered;

use async_trait::async_trait;
use qm_protocol::{Resolution, TaskSnapshot};

use crate::error::InterpretResult;

/// Strategy that turns free text into a quest action.
#[async_trait]
pub trait ActionResolver: Send + Sync {
    /// Resolve `utterance` against the ledger as currently displayed.
    async fn resolve(&self, utterance: &str, snapshot: &TaskSnapshot)
    -> InterpretResult<Resolution>;

    /// Name of this strategy (for logging).
    fn tier_name(&self) -> &str;
}

pub use model::{ModelConfig, ModelResolver};
pub use rules::RuleBasedResolver;
pub use tiered::TieredResolver;
