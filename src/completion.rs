//! Completion-model client abstraction and the OpenAI implementation.
//!
//! The engine talks to [`CompletionClient`], never to a concrete HTTP
//! client, so tests inject a scripted fake. Failures are split into the two
//! classes the engine's retry policy distinguishes: rate-limited (retryable
//! once, with an optional server-provided wait hint) and everything else
//! (immediately fatal to the model path for the request).

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ModelConfig;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Completion-call failure, classified for the retry policy.
#[derive(Debug)]
pub enum CompletionError {
    /// The provider rejected the call for throughput reasons. Retryable
    /// once; `wait_hint_secs` is the wait the provider suggested, if its
    /// error message carried one.
    RateLimited { wait_hint_secs: Option<u64> },
    /// Any non-rate-limit API rejection (bad request, auth, server error).
    Api(String),
    /// The HTTP round trip itself failed.
    Network(String),
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionError::RateLimited { wait_hint_secs } => match wait_hint_secs {
                Some(secs) => write!(f, "rate limited (retry hinted in {}s)", secs),
                None => write!(f, "rate limited"),
            },
            CompletionError::Api(msg) => write!(f, "completion API error: {}", msg),
            CompletionError::Network(msg) => write!(f, "completion network error: {}", msg),
        }
    }
}

impl std::error::Error for CompletionError {}

impl CompletionError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CompletionError::RateLimited { .. })
    }
}

/// One chat-style completion call: system instruction + user prompt in,
/// single text reply out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

/// Extract a provider wait hint ("Please try again in 20s") from an error
/// message. Returns the raw seconds; callers add their own margin.
pub fn parse_wait_hint(message: &str) -> Option<u64> {
    static SECONDS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(\d+)\s*s(?:ec)?").expect("wait-hint pattern is valid"));

    if !message.to_lowercase().contains("try again in") {
        return None;
    }
    SECONDS.captures(message)?.get(1)?.as_str().parse().ok()
}

/// Message-content backstop for providers that report throttling with a
/// non-429 status.
fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || message.contains("RPM")
        || message.contains("TPM")
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl OpenAiClient {
    /// Build a client from the environment. Returns `None` when the API key
    /// variable is unset or empty; the engine treats that as "no model
    /// configured" and takes the keyword fallback.
    pub fn from_env(config: &ModelConfig) -> Option<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .ok()?;
        Some(Self {
            http,
            api_key,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .http
            .post(OPENAI_CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || mentions_rate_limit(&body_text) {
                return Err(CompletionError::RateLimited {
                    wait_hint_secs: parse_wait_hint(&body_text),
                });
            }
            return Err(CompletionError::Api(format!(
                "OpenAI API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        parse_chat_reply(&json)
    }
}

fn parse_chat_reply(json: &serde_json::Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| CompletionError::Api("malformed completion response".to_string()))
}
