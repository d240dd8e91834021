//! Decision artifacts produced by a shield invocation.
//!
//! All of these are ephemeral: created inside one `Shield::run` call,
//! handed to the host, and never persisted by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// A rule match recorded while redacting one batch of messages.
///
/// Carries the rule label and the message position only, never the matched
/// or replaced text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionEvent {
    /// Label of the rule that matched.
    pub rule_label: String,
    /// Index of the message within the batch.
    pub message_index: usize,
    /// Whether this event was emitted to the log sink.
    pub logged: bool,
    /// When this event was recorded.
    pub created_at: DateTime<Utc>,
}

impl RedactionEvent {
    /// Record a match of the given rule against the message at `index`.
    pub fn new(rule_label: impl Into<String>, message_index: usize) -> Self {
        Self {
            rule_label: rule_label.into(),
            message_index,
            logged: false,
            created_at: Utc::now(),
        }
    }
}

/// Violation indicator returned to the host alongside the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable reason; never quotes matched content.
    pub reason: String,
    /// Text the host should surface to the end user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

impl Violation {
    /// Create a violation with a reason only.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            user_message: None,
        }
    }

    /// Attach the user-facing response text.
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = Some(user_message.into());
        self
    }
}

/// Result of one shield invocation: the (possibly rewritten) messages, an
/// optional violation, and the redaction events accumulated for the batch.
#[derive(Debug, Clone)]
pub struct ShieldOutcome {
    pub messages: Vec<Message>,
    pub violation: Option<Violation>,
    pub events: Vec<RedactionEvent>,
}

impl ShieldOutcome {
    /// Pass-through outcome: nothing matched, nothing rewritten.
    pub fn pass(messages: Vec<Message>) -> Self {
        Self {
            messages,
            violation: None,
            events: Vec::new(),
        }
    }

    /// Flagged outcome carrying a violation.
    pub fn flag(messages: Vec<Message>, violation: Violation) -> Self {
        Self {
            messages,
            violation: Some(violation),
            events: Vec::new(),
        }
    }

    /// Attach the redaction events recorded for this batch.
    pub fn with_events(mut self, events: Vec<RedactionEvent>) -> Self {
        self.events = events;
        self
    }

    /// Whether any rule rewrote any message in this batch.
    pub fn any_redacted(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Outcome of the topic validity classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationDecision {
    /// Whether the question was judged on-topic.
    pub on_topic: bool,
    /// Configured response substituted when `on_topic` is false.
    pub rejection_response: String,
}
