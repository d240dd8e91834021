//! Language-model completion backend for the topic validity shield.
//!
//! The backend is an opaque text-completion service behind a small trait so
//! tests can substitute an in-memory implementation. The shipped
//! implementation talks to an OpenRouter-style chat-completions API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TopicGuardConfig;
use crate::error::{ShieldError, ShieldResult};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Opaque text-completion service: one prompt in, generated text out.
///
/// Exactly one call is made per shield invocation; retries, if any, are the
/// implementation's concern.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, prompt: &str) -> ShieldResult<String>;
}

/// Request to the chat-completions API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the chat-completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Completion backend backed by an OpenRouter-style API.
pub struct OpenRouterBackend {
    model: String,
    api_key: String,
    client: Client,
}

impl OpenRouterBackend {
    /// Create a backend from the topic guard configuration.
    pub fn new(config: &TopicGuardConfig) -> ShieldResult<Self> {
        if config.api_key.is_empty() {
            return Err(ShieldError::Configuration(
                "topic guard backend requires an API key".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShieldError::Backend(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    async fn complete_async(&self, prompt: &str) -> ShieldResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: Some(20),
        };

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ShieldError::Backend(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ShieldError::Backend(format!("API error {status}")));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ShieldError::Backend(format!("Failed to parse response: {e}")))?;

        // An empty choice list yields an empty answer, which the classifier
        // treats as off-topic rather than as a transport failure.
        Ok(chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

impl CompletionBackend for OpenRouterBackend {
    /// Bridge the async client into the synchronous shield contract.
    ///
    /// Must be called from within a multi-thread Tokio runtime; the request
    /// honors the configured timeout rather than imposing its own retry
    /// policy.
    fn complete(&self, prompt: &str) -> ShieldResult<String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(self.complete_async(prompt))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_requires_api_key() {
        let config = TopicGuardConfig::default();
        assert!(config.api_key.is_empty());
        assert!(matches!(
            OpenRouterBackend::new(&config),
            Err(ShieldError::Configuration(_))
        ));
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_chat_response_deserialization() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "yes"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content, "yes");
    }
}
