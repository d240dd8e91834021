//! Shield Guards - safety shield providers for LLM agent frameworks.
//!
//! Two plugin-style shields invoked by a host safety pipeline, once per
//! message batch:
//!
//! - [`RedactionShield`]: applies an ordered list of regex pattern/replacement
//!   rules to message content and reports which rules fired.
//! - [`TopicValidityShield`]: asks a language-model backend whether the
//!   latest user question is on the configured topic, rejecting off-topic
//!   queries with a configured response (fail closed).
//!
//! Both implement the [`Shield`] trait: `run(messages)` returns the possibly
//! rewritten batch plus an optional [`Violation`]. Hosts construct shields
//! through [`provider::create_shield`] or directly from configuration.
//!
//! ```no_run
//! use shield_guards::{Config, Message, provider};
//!
//! let config = Config::default();
//! let shield = provider::create_shield("content_redaction", &config)?;
//! let outcome = shield.run(&[Message::user("My password is hunter2")])?;
//! assert!(outcome.any_redacted());
//! # Ok::<(), shield_guards::ShieldError>(())
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod provider;

pub use config::{Config, RedactionConfig, RuleSpec, TopicGuardConfig};
pub use domain::{
    ClassificationDecision, Message, RedactionEvent, Role, ShieldOutcome, Violation,
};
pub use engine::{
    CompletionBackend, OpenRouterBackend, RedactionRule, RedactionShield, RedactionSink, RuleSet,
    Shield, TopicValidityShield, TracingSink,
};
pub use error::{ShieldError, ShieldResult};
