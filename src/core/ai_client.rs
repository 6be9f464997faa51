//! Chat-completion client used by the AI-backed commands.
//!
//! Every failure is folded into an `"AI Error: ..."` string so callers can
//! render the result like any other answer.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1500;
pub const AI_ERROR_PREFIX: &str = "AI Error: ";

const PERSONA: &str = "You are a Quantum Optics expert teaching through a terminal interface.";
const FORMATTING: &str =
    "Format responses for monospace display with max 80 columns. Use unicode math symbols.";

/// Anything that can answer a prompt with plain text. Implementations never fail.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn query(&self, prompt: &str, context: &str) -> String;
}

pub fn system_prompt(context: &str) -> String {
    format!("{PERSONA}\n{context}\n{FORMATTING}")
}

pub fn build_request(model: &str, prompt: &str, context: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(system_prompt(context)),
            ChatMessage::user(prompt),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

#[derive(Debug)]
enum AiError {
    MissingKey,
    Network(reqwest::Error),
    Status {
        status: reqwest::StatusCode,
        summary: String,
    },
    Malformed(serde_json::Error),
    NoChoices,
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::MissingKey => write!(
                f,
                "no API key configured (set DEEPSEEK_API_KEY or run `quantoptik auth`)"
            ),
            AiError::Network(err) => write!(f, "{err}"),
            AiError::Status { status, summary } => {
                write!(f, "API request failed with status {status}: {summary}")
            }
            AiError::Malformed(err) => write!(f, "malformed response: {err}"),
            AiError::NoChoices => write!(f, "response contained no choices"),
        }
    }
}

impl std::error::Error for AiError {}

pub struct AiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl AiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: construct_api_url(base_url, "chat/completions"),
            api_key,
            model: model.into(),
        }
    }

    async fn try_query(&self, prompt: &str, context: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingKey)?;
        let request = build_request(&self.model, prompt, context);

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion request");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(AiError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(AiError::Network)?;
        debug!(%status, bytes = body.len(), "Chat completion response received");

        if !status.is_success() {
            return Err(AiError::Status {
                status,
                summary: summarize_error_body(&body),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(AiError::Malformed)?;
        let choice = parsed.choices.into_iter().next().ok_or(AiError::NoChoices)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl ChatCompletion for AiClient {
    async fn query(&self, prompt: &str, context: &str) -> String {
        match self.try_query(prompt, context).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "AI query failed");
                format!("{AI_ERROR_PREFIX}{err}")
            }
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    Some(summary.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}
