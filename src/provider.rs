//! Outbound text-completion calls.
//!
//! [`CompletionClient`] is the seam between the counter and the model
//! providers. [`HttpCompletionClient`] speaks the OpenAI, Anthropic and
//! Google wire formats and classifies failures into [`ProviderError`] at
//! the boundary, so callers match on variants instead of message text.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{LlmCountError, Result};
use crate::models::{ModelInfo, Provider};

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: &'static ModelInfo,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Why a completion call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{message}")]
    Auth { message: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("provider returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Sends a completion request and returns the reply text.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = std::result::Result<String, ProviderError>> + Send;
}

/// API keys per provider.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    openai: Option<String>,
    anthropic: Option<String>,
    google: Option<String>,
}

impl Credentials {
    /// Read keys from the environment variables named by
    /// [`Provider::credential_env`]. Empty values count as missing.
    pub fn from_env() -> Self {
        let read = |p: Provider| {
            std::env::var(p.credential_env())
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        Self {
            openai: read(Provider::OpenAi),
            anthropic: read(Provider::Anthropic),
            google: read(Provider::Google),
        }
    }

    pub fn with(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let slot = match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Anthropic => &mut self.anthropic,
            Provider::Google => &mut self.google,
        };
        *slot = Some(key.into());
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::Google => self.google.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Completion client backed by the providers' REST APIs.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    credentials: Credentials,
    openai_base_url: String,
    anthropic_base_url: String,
    google_base_url: String,
}

impl HttpCompletionClient {
    pub fn new(config: &ProviderConfig, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmCountError::config_with_source("failed to build HTTP client", e))?;
        Ok(Self {
            http,
            credentials,
            openai_base_url: trim_base(&config.openai_base_url),
            anthropic_base_url: trim_base(&config.anthropic_base_url),
            google_base_url: trim_base(&config.google_base_url),
        })
    }

    fn build(&self, request: &CompletionRequest, key: &str) -> reqwest::RequestBuilder {
        match request.model.provider {
            Provider::OpenAi => self
                .http
                .post(format!("{}/chat/completions", self.openai_base_url))
                .bearer_auth(key)
                .json(&openai_body(request)),
            Provider::Anthropic => self
                .http
                .post(format!("{}/messages", self.anthropic_base_url))
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&anthropic_body(request)),
            Provider::Google => self
                .http
                .post(format!(
                    "{}/models/{}:generateContent",
                    self.google_base_url, request.model.id
                ))
                .header("x-goog-api-key", key)
                .json(&google_body(request)),
        }
    }
}

impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError> {
        let provider = request.model.provider;
        let key = self
            .credentials
            .get(provider)
            .ok_or_else(|| ProviderError::Auth {
                message: format!("{} is not set", provider.credential_env()),
            })?;

        debug!(model = request.model.id, %provider, "sending completion request");
        let response = self
            .build(&request, key)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &body));
        }

        let text = extract_text(provider, &body)?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

fn openai_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model.id,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    })
}

fn anthropic_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model.id,
        "system": request.system,
        "messages": [{ "role": "user", "content": request.user }],
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    })
}

fn google_body(request: &CompletionRequest) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": request.system }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.user }] }],
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        },
    })
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

/// Pull the reply text out of a successful response body.
fn extract_text(provider: Provider, body: &str) -> std::result::Result<String, ProviderError> {
    let decode = |e: serde_json::Error| ProviderError::Decode(e.to_string());
    let text = match provider {
        Provider::OpenAi => {
            let parsed: OpenAiResponse = serde_json::from_str(body).map_err(decode)?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()
        }
        Provider::Anthropic => {
            let parsed: AnthropicResponse = serde_json::from_str(body).map_err(decode)?;
            parsed
                .content
                .into_iter()
                .filter_map(|b| b.text)
                .collect::<Vec<_>>()
                .join("")
        }
        Provider::Google => {
            let parsed: GoogleResponse = serde_json::from_str(body).map_err(decode)?;
            parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
                .unwrap_or_default()
        }
    };
    Ok(text)
}

/// Map a non-success HTTP status to an error class.
pub fn classify_status(status: u16, body: &str) -> ProviderError {
    let message = upstream_message(body);
    match status {
        401 | 403 => ProviderError::Auth { message },
        429 => ProviderError::RateLimited,
        408 | 504 => ProviderError::Timeout,
        _ => ProviderError::Upstream { status, message },
    }
}

/// All three providers report `{"error": {"message": ...}}`.
fn upstream_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
    match from_json {
        Some(m) => m,
        None => body.chars().take(200).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_model;

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: find_model(model).unwrap(),
            system: "sys".into(),
            user: "hello".into(),
            temperature: 0.0,
            max_tokens: 100,
        }
    }

    #[test]
    fn openai_body_shape() {
        let body = openai_body(&request("gpt-4o"));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["max_tokens"], 100);
    }

    #[test]
    fn anthropic_body_puts_system_at_top_level() {
        let body = anthropic_body(&request("claude-3-haiku-20240307"));
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn google_body_shape() {
        let body = google_body(&request("gemini-1.5-flash"));
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn extract_openai_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"3, 2, 1"}}]}"#;
        assert_eq!(extract_text(Provider::OpenAi, body).unwrap(), "3, 2, 1");
    }

    #[test]
    fn extract_anthropic_text_joins_blocks() {
        let body = r#"{"content":[{"type":"text","text":"1,"},{"type":"text","text":"2"}]}"#;
        assert_eq!(extract_text(Provider::Anthropic, body).unwrap(), "1,2");
    }

    #[test]
    fn extract_google_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"4,5"}]}}]}"#;
        assert_eq!(extract_text(Provider::Google, body).unwrap(), "4,5");
    }

    #[test]
    fn extract_missing_content_is_empty() {
        let body = r#"{"choices":[]}"#;
        assert_eq!(extract_text(Provider::OpenAi, body).unwrap(), "");
    }

    #[test]
    fn extract_garbage_is_decode_error() {
        let err = extract_text(Provider::OpenAi, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn classify_statuses() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        assert_eq!(
            classify_status(401, body),
            ProviderError::Auth {
                message: "Incorrect API key provided".into()
            }
        );
        assert_eq!(classify_status(429, ""), ProviderError::RateLimited);
        assert_eq!(classify_status(504, ""), ProviderError::Timeout);
        assert!(matches!(
            classify_status(500, "oops"),
            ProviderError::Upstream { status: 500, .. }
        ));
    }

    #[test]
    fn credentials_lookup() {
        let creds = Credentials::default().with(Provider::Anthropic, "sk-ant");
        assert_eq!(creds.get(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(creds.get(Provider::OpenAi), None);
    }

    #[tokio::test]
    async fn missing_key_is_auth_error_without_network() {
        let client = HttpCompletionClient::new(&ProviderConfig::default(), Credentials::default())
            .unwrap();
        let err = client.complete(request("gpt-4")).await.unwrap_err();
        match err {
            ProviderError::Auth { message } => assert!(message.contains("OPENAI_API_KEY")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
