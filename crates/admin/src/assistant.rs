//! Upstream client for the AI shopping assistant.
//!
//! The admin panel exposes a stateless proxy endpoint; this client does the
//! single upstream call to the text-generation API. No conversation state
//! is held on either side of it.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Assistant upstream configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AssistantConfig {
    /// Messages endpoint of the generation API.
    pub endpoint: String,
    /// API key for the generation API.
    pub api_key: SecretString,
    /// Model identifier to request.
    pub model: String,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Errors from the assistant upstream.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Transport-level failure.
    #[error("assistant request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("assistant API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The upstream response carried no usable text.
    #[error("assistant response contained no text")]
    Empty,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Client for the generation API.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl AssistantClient {
    /// Create a new assistant client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(AssistantClientInner {
                client,
                endpoint: config.endpoint.clone(),
                model: config.model.clone(),
            }),
        }
    }

    /// Generate a single response for a shopper prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream request fails or yields no text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let request = GenerateRequest {
            model: &self.inner.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "assistant upstream returned non-success status"
            );
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "failed to parse assistant response");
            AssistantError::Api {
                status: status.as_u16(),
                message: format!("unparseable response: {e}"),
            }
        })?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AssistantError::Empty);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_concatenation() {
        let raw = r#"{"content": [
            {"type": "text", "text": "Hello "},
            {"type": "tool_use", "id": "x"},
            {"type": "text", "text": "shopper"}
        ]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parse");
        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();
        assert_eq!(text, "Hello shopper");
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AssistantConfig {
            endpoint: "https://api.example.com/v1/messages".to_string(),
            api_key: SecretString::from("sk-secret-value"),
            model: "generator-large".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-secret-value"));
    }
}
