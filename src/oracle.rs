//! Generative inference backend, used as the last-resort interpreter.
//!
//! The backend is injected into the pipeline as an explicit, optional
//! dependency — there is no process-wide singleton. Tests either omit it
//! or point the HTTP adapter at a local mock.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// A text-completion backend.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Issue a completion request and return the raw response text.
    async fn complete(&self, prompt: &str, max_tokens: u32, timeout: Duration) -> Result<String>;

    /// Human-readable backend identity, for health and doctor output.
    fn describe(&self) -> String;
}

/// HTTP adapter for a Gemini-style `generateContent` endpoint.
pub struct GenerativeHttpBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GenerativeHttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(crate::fetch::USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }
}

#[async_trait]
impl InferenceBackend for GenerativeHttpBackend {
    async fn complete(&self, prompt: &str, max_tokens: u32, timeout: Duration) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": max_tokens },
        });

        let response = self
            .client
            .post(self.endpoint())
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("inference request failed: {}", response.status()));
        }

        let reply: Value = response.json().await?;

        // Response shapes vary across backend versions; collect every text
        // part under candidates[].content.parts[].
        let mut texts: Vec<String> = Vec::new();
        if let Some(candidates) = reply.get("candidates").and_then(|c| c.as_array()) {
            for candidate in candidates {
                if let Some(parts) = candidate
                    .pointer("/content/parts")
                    .and_then(|p| p.as_array())
                {
                    for part in parts {
                        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                            texts.push(text.to_string());
                        }
                    }
                }
            }
        }

        if texts.is_empty() {
            return Err(anyhow!("inference response contained no text"));
        }
        Ok(texts.join("\n"))
    }

    fn describe(&self) -> String {
        format!("generative-http ({})", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "The answer is" },
                        { "text": "{\"answer\": 7}" }
                    ]}
                }]
            })))
            .mount(&server)
            .await;

        let backend = GenerativeHttpBackend::new(server.uri(), "test-model", "k");
        let reply = backend
            .complete("what is the task?", 512, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(reply.contains("The answer is"));
        assert!(reply.contains(r#"{"answer": 7}"#));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let backend = GenerativeHttpBackend::new(server.uri(), "m", "k");
        assert!(backend
            .complete("p", 16, Duration::from_secs(5))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_complete_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = GenerativeHttpBackend::new(server.uri(), "m", "k");
        assert!(backend
            .complete("p", 16, Duration::from_secs(5))
            .await
            .is_err());
    }
}
