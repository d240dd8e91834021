//! Provider factory for the closed set of shield implementations.
//!
//! Hosts discover shields by configuration identifier; this maps those
//! identifiers onto constructors. A registry lookup, not reflection.

use crate::config::Config;
use crate::engine::{RedactionShield, Shield, TopicValidityShield};
use crate::error::{ShieldError, ShieldResult};

/// Identifier of the content redaction shield.
pub const CONTENT_REDACTION: &str = "content_redaction";
/// Identifier of the topic validity shield.
pub const TOPIC_VALIDITY: &str = "topic_validity";

/// Construct the shield registered under `provider_id`.
///
/// Load-time failures (bad rule configuration, missing backend credentials)
/// are returned here so the host can refuse to register the shield.
pub fn create_shield(provider_id: &str, config: &Config) -> ShieldResult<Box<dyn Shield>> {
    match provider_id {
        CONTENT_REDACTION => {
            let shield = RedactionShield::new(&config.redaction)?;
            tracing::info!(
                provider_id,
                rule_count = shield.rules().len(),
                "Shield provider constructed"
            );
            Ok(Box::new(shield))
        }
        TOPIC_VALIDITY => {
            let shield = TopicValidityShield::with_default_backend(config.topic_guard.clone())?;
            tracing::info!(provider_id, "Shield provider constructed");
            Ok(Box::new(shield))
        }
        other => Err(ShieldError::Configuration(format!(
            "Unknown shield provider: {other}"
        ))),
    }
}

/// The provider identifiers this crate can construct.
pub fn available_providers() -> &'static [&'static str] {
    &[CONTENT_REDACTION, TOPIC_VALIDITY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;

    #[test]
    fn test_create_redaction_shield() {
        let config = Config::default();
        let shield = create_shield(CONTENT_REDACTION, &config).unwrap();

        assert_eq!(shield.shield_id(), CONTENT_REDACTION);
        let outcome = shield.run(&[Message::user("hello")]).unwrap();
        assert!(outcome.violation.is_none());
    }

    #[test]
    fn test_topic_shield_requires_api_key() {
        // Default config ships without credentials; registration must fail
        // rather than produce a half-usable shield.
        let config = Config::default();
        assert!(matches!(
            create_shield(TOPIC_VALIDITY, &config),
            Err(ShieldError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = Config::default();
        assert!(matches!(
            create_shield("prompt_guard", &config),
            Err(ShieldError::Configuration(_))
        ));
    }

    #[test]
    fn test_available_providers() {
        assert_eq!(available_providers().len(), 2);
    }
}
