// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text-generation API client for motivational messages.
//!
//! Handles:
//! - Chat-completion requests with a strict JSON output schema
//! - A deadline on every attempt
//! - Retries with exponential backoff (429, 5xx, timeouts, connection errors)
//! - Re-validation of the model's JSON against the schema

use crate::config::AiConfig;
use crate::error::InsightError;
use crate::models::{MotivationalMessage, Tone};
use crate::services::prompt::{PromptBundle, SCHEMA_NAME};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Longest slice of an error body kept in [`InsightError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 200;

const TOP_P: f32 = 1.0;

/// Per-call overrides for generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Skip the cache lookup (the fresh result is still cached)
    pub bypass_cache: bool,
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Chat-completion request body (OpenAI-compatible).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: Value,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Raw HTTP reply from the generation API.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one chat-completion request over the wire.
///
/// Implementations return [`InsightError::Transport`] for failures that
/// produced no HTTP status; any status (including errors) is an `HttpReply`.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn post_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<HttpReply, InsightError>;
}

/// `reqwest`-backed transport for an OpenAI-compatible endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building generation API HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn post_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<HttpReply, InsightError> {
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| InsightError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| InsightError::Transport(e.without_url().to_string()))?;

        Ok(HttpReply { status, body })
    }
}

/// Client settings derived from [`AiConfig`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub model: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&AiConfig> for ClientSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            model: config.model.clone(),
            timeout: config.timeout(),
            max_attempts: config.max_retries,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Attempt counter for a single `generate` call.
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_attempts: u32,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Move past a retryable failure. Returns the delay to wait before the
    /// next attempt, or `None` once the attempts are used up.
    fn advance(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        let delay = retry_backoff_delay(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}

/// Backoff before the attempt following failed attempt `attempt`: 2^n seconds,
/// no jitter.
pub fn retry_backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Generation client with timeout, retry and output validation.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn CompletionTransport>,
    settings: ClientSettings,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn CompletionTransport>, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Create a client that talks to the configured HTTP endpoint.
    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        let transport =
            HttpTransport::new(&config.base_url, config.api_key.clone(), config.timeout())?;
        Ok(Self::new(Arc::new(transport), ClientSettings::from(config)))
    }

    /// Generate a message for the prompt.
    ///
    /// Transient faults are retried here; only terminal faults are returned.
    pub async fn generate(
        &self,
        prompt: &PromptBundle,
        options: &GenerateOptions,
    ) -> Result<MotivationalMessage, InsightError> {
        let request = self.build_request(prompt, options);
        let mut retry = RetryState::new(self.settings.max_attempts);

        loop {
            tracing::debug!(
                model = %request.model,
                attempt = retry.attempt,
                max_attempts = retry.max_attempts,
                "Sending generation request"
            );

            let err = match self.attempt_once(&request).await {
                Ok(reply) => {
                    let message = parse_completion(&reply.body, &request.model)?;
                    tracing::info!(
                        model = %message.model,
                        attempts = retry.attempt,
                        tone = %message.tone,
                        "Motivational message generated"
                    );
                    return Ok(message);
                }
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            match retry.advance() {
                Some(delay) => {
                    tracing::warn!(
                        error = %err,
                        attempt = retry.attempt - 1,
                        max_attempts = retry.max_attempts,
                        delay_secs = delay.as_secs(),
                        "Generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::warn!(
                        error = %err,
                        attempts = retry.attempt,
                        "Generation attempts exhausted"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// One bounded attempt. Non-2xx statuses become [`InsightError::Api`].
    async fn attempt_once(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<HttpReply, InsightError> {
        let timeout = self.settings.timeout;
        let reply = tokio::time::timeout(timeout, self.transport.post_completion(request))
            .await
            .map_err(|_| InsightError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })??;

        if reply.is_success() {
            return Ok(reply);
        }

        if reply.status == 429 {
            tracing::warn!("Generation API rate limit hit (429)");
        }

        Err(InsightError::Api {
            status_code: reply.status,
            message: reply.body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }

    fn build_request(
        &self,
        prompt: &PromptBundle,
        options: &GenerateOptions,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: options
                .model
                .clone()
                .unwrap_or_else(|| self.settings.model.clone()),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": prompt.schema.clone(),
                }
            }),
            max_tokens: options.max_tokens.unwrap_or(self.settings.max_tokens),
            temperature: options.temperature.unwrap_or(self.settings.temperature),
            top_p: TOP_P,
        }
    }
}

/// Chat-completion response envelope.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Parse a successful response body into a message, re-checking the schema.
fn parse_completion(
    body: &str,
    requested_model: &str,
) -> Result<MotivationalMessage, InsightError> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        InsightError::Validation(format!("Malformed completion response: {}", e))
    })?;

    let content = response
        .choices
        .first()
        .ok_or_else(|| InsightError::Validation("Completion has no choices".to_string()))?
        .message
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| InsightError::Validation("Completion content is empty".to_string()))?;

    let (message, tone) = validate_content(content)?;

    let model = response
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| requested_model.to_string());

    Ok(MotivationalMessage {
        message,
        tone,
        generated_at: Utc::now(),
        model,
        cached: false,
    })
}

/// Check model output against the response schema field by field.
fn validate_content(content: &str) -> Result<(String, Tone), InsightError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| InsightError::Validation(format!("Model output is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| InsightError::Validation("Model output is not an object".to_string()))?;

    if let Some(extra) = object.keys().find(|k| *k != "message" && *k != "tone") {
        return Err(InsightError::Validation(format!(
            "Model output has unexpected field '{}'",
            extra
        )));
    }

    let message = object
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            InsightError::Validation("Model output 'message' must be a non-empty string".to_string())
        })?;

    let tone = object
        .get("tone")
        .and_then(Value::as_str)
        .ok_or_else(|| InsightError::Validation("Model output 'tone' must be a string".to_string()))?
        .parse::<Tone>()
        .map_err(InsightError::Validation)?;

    Ok((message.to_string(), tone))
}

/// Scripted transport for tests (debug builds only).
#[cfg(debug_assertions)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// One scripted outcome.
    #[derive(Debug, Clone)]
    pub enum ScriptedReply {
        Status(u16, String),
        /// Never answers, so the attempt deadline fires.
        Hang,
        ConnectionError(String),
    }

    impl ScriptedReply {
        /// 200 reply whose first choice carries `content`.
        pub fn content(model: &str, content: &str) -> Self {
            ScriptedReply::Status(200, completion_body(model, content))
        }

        /// 200 reply with a well-formed message.
        pub fn message(model: &str, message: &str, tone: Tone) -> Self {
            let content = json!({ "message": message, "tone": tone.as_str() }).to_string();
            Self::content(model, &content)
        }
    }

    /// Build a chat-completion body with a single choice.
    pub fn completion_body(model: &str, content: &str) -> String {
        json!({
            "id": "cmpl-test",
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    /// Plays back replies in order, then repeats `repeat` (if set).
    #[derive(Default)]
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<ScriptedReply>>,
        repeat: Option<ScriptedReply>,
        calls: AtomicUsize,
        requests: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(replies: Vec<ScriptedReply>) -> Self {
            Self {
                script: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        /// Answer every call with the same reply.
        pub fn repeating(reply: ScriptedReply) -> Self {
            Self {
                repeat: Some(reply),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<ChatCompletionRequest> {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        fn next_reply(&self) -> ScriptedReply {
            self.script
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .or_else(|| self.repeat.clone())
                .unwrap_or_else(|| ScriptedReply::ConnectionError("script exhausted".to_string()))
        }
    }

    #[async_trait]
    impl CompletionTransport for ScriptedTransport {
        async fn post_completion(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<HttpReply, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request.clone());

            match self.next_reply() {
                ScriptedReply::Status(status, body) => Ok(HttpReply { status, body }),
                ScriptedReply::Hang => std::future::pending().await,
                ScriptedReply::ConnectionError(msg) => Err(InsightError::Transport(msg)),
            }
        }
    }
}
