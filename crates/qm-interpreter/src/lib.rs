//! Quest interpreter: turns a free-text utterance plus the current
//! ledger snapshot into exactly one typed [`Action`](qm_protocol::Action)
//! or a diagnosable [`InterpretError`].
//!
//! The rule-based path ([`interpret`]) is pure and synchronous. The
//! [`ActionResolver`] trait puts it behind the same seam as the
//! model-delegated strategy so callers can pick one by configuration.

pub mod classify;
pub mod clock;
pub mod error;
pub mod lexical;
pub mod position;
pub mod resolve;
pub mod resolver;

pub use classify::{Intent, classify};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{InterpretError, InterpretResult, TargetMiss};
pub use position::resolve_position;
pub use resolve::interpret;
pub use resolver::{ActionResolver, ModelConfig, ModelResolver, RuleBasedResolver, TieredResolver};
