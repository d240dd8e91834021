//! Shield engine implementations.
//!
//! This module contains the two shield providers and their building blocks:
//! - Pattern Store: compiles configured rule descriptors into a `RuleSet`
//! - Redaction Engine: applies a `RuleSet` to a message batch
//! - Topic Validity Classifier: delegates a yes/no topic check to a
//!   language-model backend

mod backend;
mod patterns;
mod redaction;
mod topic;

pub use backend::*;
pub use patterns::*;
pub use redaction::*;
pub use topic::*;

use crate::domain::{Message, ShieldOutcome};
use crate::error::ShieldResult;

/// Capability interface shared by all shield providers.
///
/// The host safety pipeline calls `run` once per message batch; the shield
/// returns the (possibly rewritten) batch plus an optional violation.
/// Implementations hold no per-call state and may be shared across
/// concurrent invocations.
pub trait Shield: Send + Sync {
    /// Stable identifier for registration and logging.
    fn shield_id(&self) -> &str;

    /// Evaluate one batch of messages.
    fn run(&self, messages: &[Message]) -> ShieldResult<ShieldOutcome>;
}
