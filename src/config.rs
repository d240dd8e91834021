//! Configuration for the shield providers.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ShieldResult;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Content redaction shield settings.
    #[serde(default)]
    pub redaction: RedactionConfig,
    /// Topic validity shield settings.
    #[serde(default)]
    pub topic_guard: TopicGuardConfig,
}

/// Raw rule descriptor as it appears in configuration.
///
/// Compiled into a `RedactionRule` by the pattern store; order in the
/// configuration document is the application order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regular expression to search for.
    pub pattern: String,
    /// Replacement template; may reference capture groups positionally
    /// (`$1` or `${1}`).
    pub replacement: String,
    /// Identifier used in match reports and logs. Defaults to a truncated
    /// form of the pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RuleSpec {
    /// Create a rule descriptor without an explicit label.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            label: None,
        }
    }

    /// Set the report/log label for this rule.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Content redaction shield configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionConfig {
    /// Ordered rule descriptors. Later rules see text already rewritten by
    /// earlier rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleSpec>,
    /// Emit one log line per redaction event (rule label and message index
    /// only, never the matched text).
    #[serde(default = "default_true")]
    pub log_redactions: bool,
    /// Abort loading on the first invalid pattern instead of skipping it
    /// with a warning.
    #[serde(default)]
    pub fail_on_pattern_error: bool,
}

fn default_true() -> bool {
    true
}

/// The shipped default rule set.
///
/// Replacement tokens are chosen so that no rule's output matches its own
/// pattern again: a full pass over already-redacted text is a no-op.
fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(r"(?i)\bpassword\b(\s+is)?[\s:=]+\S+", "[REDACTED_PASSWORD]")
            .with_label("password"),
        RuleSpec::new(
            r"(?i)\b(api[_-]?key|access[_-]?token|secret)\b[\s:=]+\S+",
            "[REDACTED_CREDENTIAL]",
        )
        .with_label("credential"),
        RuleSpec::new(r"\bAKIA[0-9A-Z]{16}\b", "[REDACTED_AWS_KEY]").with_label("aws_access_key"),
        RuleSpec::new(r"\b(\d{3})-\d{2}-\d{4}\b", "[REDACTED_SSN_${1}]").with_label("ssn"),
        RuleSpec::new(
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            "[REDACTED_EMAIL]",
        )
        .with_label("email"),
        RuleSpec::new(r"\b\d{4}(?:[ -]?\d{4}){3}\b", "[REDACTED_CARD]").with_label("credit_card"),
        RuleSpec::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b", "[REDACTED_IP]").with_label("ipv4"),
    ]
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            log_redactions: true,
            fail_on_pattern_error: false,
        }
    }
}

/// Topic validity shield configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicGuardConfig {
    /// Description of the topic the agent is allowed to discuss.
    pub topic: String,
    /// Response substituted for off-topic questions.
    pub rejection_response: String,
    /// Model identifier sent to the completion backend.
    pub model: String,
    /// API key for the completion backend.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TopicGuardConfig {
    fn default() -> Self {
        Self {
            topic: "general assistance with this product".to_string(),
            rejection_response: "I can only help with questions about this product.".to_string(),
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SHIELD_*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> ShieldResult<Self> {
        let config = ConfigLoader::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(false))
            // Layer on local overrides
            .add_source(File::with_name("config/local").required(false))
            // Layer on environment variables with SHIELD_ prefix
            .add_source(
                Environment::with_prefix("SHIELD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_redaction_config() {
        let config = RedactionConfig::default();
        assert!(config.log_redactions);
        assert!(!config.fail_on_pattern_error);
        assert!(!config.rules.is_empty());
        // Every shipped rule carries an explicit label
        assert!(config.rules.iter().all(|r| r.label.is_some()));
    }

    #[test]
    fn test_default_topic_guard_config() {
        let config = TopicGuardConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.rejection_response.is_empty());
    }

    #[test]
    fn test_rule_spec_deserialization() {
        let spec: RuleSpec = serde_json::from_str(
            r#"{"pattern": "\\d+", "replacement": "[NUM]", "label": "number"}"#,
        )
        .unwrap();
        assert_eq!(spec.pattern, "\\d+");
        assert_eq!(spec.label.as_deref(), Some("number"));

        // Label is optional
        let spec: RuleSpec =
            serde_json::from_str(r#"{"pattern": "\\d+", "replacement": "[NUM]"}"#).unwrap();
        assert!(spec.label.is_none());
    }
}
