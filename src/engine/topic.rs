//! Topic Validity Classifier - rejects off-topic questions.
//!
//! Builds one fixed classification prompt around the latest user message,
//! asks the completion backend for a yes/no verdict, and fails closed on
//! anything that is not a clear "yes". Backend failures are surfaced as
//! shield errors, never treated as on-topic.

use uuid::Uuid;

use crate::config::TopicGuardConfig;
use crate::domain::{ClassificationDecision, Message, Role, ShieldOutcome, Violation};
use crate::engine::{CompletionBackend, OpenRouterBackend, Shield};
use crate::error::ShieldResult;

/// Shield that checks whether the latest user question stays on the
/// configured topic.
pub struct TopicValidityShield {
    config: TopicGuardConfig,
    backend: Box<dyn CompletionBackend>,
}

impl TopicValidityShield {
    /// Create the shield with an explicit backend.
    pub fn new(config: TopicGuardConfig, backend: Box<dyn CompletionBackend>) -> Self {
        Self { config, backend }
    }

    /// Create the shield with the OpenRouter-style backend from config.
    pub fn with_default_backend(config: TopicGuardConfig) -> ShieldResult<Self> {
        let backend = OpenRouterBackend::new(&config)?;
        Ok(Self::new(config, Box::new(backend)))
    }

    fn build_prompt(&self, question: &str) -> String {
        format!(
            "You are a topic compliance checker for an assistant that only \
             answers questions about the following topic:\n\n\
             {}\n\n\
             Question: {}\n\n\
             Is this question about the topic above? \
             Answer with exactly one word: 'yes' or 'no'.",
            self.config.topic, question
        )
    }

    /// Classify one question, making exactly one backend call.
    pub fn classify(&self, question: &str) -> ShieldResult<ClassificationDecision> {
        let prompt = self.build_prompt(question);
        let answer = self.backend.complete(&prompt)?;

        Ok(ClassificationDecision {
            on_topic: answer_is_affirmative(&answer),
            rejection_response: self.config.rejection_response.clone(),
        })
    }
}

/// Parse the backend's answer for a leading "yes" token, case-insensitive.
///
/// Anything else, including empty or rambling output, counts as negative:
/// false rejection is preferred over letting off-topic content through.
fn answer_is_affirmative(answer: &str) -> bool {
    let token: String = answer
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    token.eq_ignore_ascii_case("yes")
}

impl Shield for TopicValidityShield {
    fn shield_id(&self) -> &str {
        "topic_validity"
    }

    fn run(&self, messages: &[Message]) -> ShieldResult<ShieldOutcome> {
        let run_id = Uuid::new_v4();

        // Only the latest user turn is classified; a batch without one has
        // nothing to check.
        let Some(index) = messages.iter().rposition(|m| m.role == Role::User) else {
            tracing::debug!(run_id = %run_id, "No user message in batch, passing through");
            return Ok(ShieldOutcome::pass(messages.to_vec()));
        };

        let decision = self.classify(&messages[index].content)?;
        tracing::debug!(
            run_id = %run_id,
            on_topic = decision.on_topic,
            message_index = index,
            "Topic classification complete"
        );

        if decision.on_topic {
            return Ok(ShieldOutcome::pass(messages.to_vec()));
        }

        let mut out = messages.to_vec();
        out[index].content = decision.rejection_response.clone();

        let violation = Violation::new("Question is off-topic for this agent")
            .with_user_message(decision.rejection_response);
        Ok(ShieldOutcome::flag(out, violation))
    }
}
