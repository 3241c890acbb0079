//! OpenAiBackend - direct REST implementation of the generation contract.
//!
//! Calls the OpenAI Chat Completions API directly.
//! Configuration priority: ~/.config/postspark/secrets.toml > environment variables

use async_trait::async_trait;
use postspark_core::backend::{
    BackendFailure, BackendResponse, GenerationBackend, PromptRequest,
};
use postspark_core::config::Secrets;
use postspark_core::result::TokenUsage;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Backend implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: None,
        }
    }

    /// Loads configuration from the secrets file or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/postspark/secrets.toml
    /// 2. Environment variables (OPENAI_API_KEY, OPENAI_MODEL_NAME)
    ///
    /// Model name defaults to `gpt-4o` if not specified.
    pub fn try_from_env() -> Result<Self, BackendFailure> {
        if let Ok(secrets) = Secrets::load() {
            if let Some(openai) = secrets.openai {
                let model = openai.model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
                return Ok(Self::new(openai.api_key, model));
            }
        }

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            BackendFailure::MissingCredentials(
                "OPENAI_API_KEY not found in ~/.config/postspark/secrets.toml or environment variables"
                    .into(),
            )
        })?;

        let model = env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<BackendResponse, BackendFailure> {
        let response = self
            .client
            .post(BASE_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| BackendFailure::Transport {
                message: format!("OpenAI API request failed: {err}"),
                timeout: err.is_timeout(),
                connect: err.is_connect(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(shape_http_failure(status, body_text, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            BackendFailure::MalformedResponse(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_response(parsed)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &PromptRequest) -> Result<BackendResponse, BackendFailure> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        tracing::debug!("[OpenAiBackend] dispatching generation, model={}", self.model);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    r#type: Option<String>,
    code: Option<String>,
}

fn extract_response(response: ChatCompletionResponse) -> Result<BackendResponse, BackendFailure> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            BackendFailure::MalformedResponse(
                "OpenAI API returned no content in the response".into(),
            )
        })?;

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(BackendResponse { text, usage })
}

fn shape_http_failure(
    status: StatusCode,
    body: String,
    retry_after_secs: Option<u64>,
) -> BackendFailure {
    let (code, message) = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| (wrapper.error.code, wrapper.error.message))
        .unwrap_or_else(|_| (None, body.clone()));

    if code.as_deref() == Some("content_policy_violation") {
        return BackendFailure::ContentRejected(message);
    }

    BackendFailure::Http {
        status: status.as_u16(),
        message,
        retry_after_secs,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<u64> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds);
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_http_failure_detects_policy_violation() {
        let body = r#"{"error":{"message":"Your request was rejected","type":"invalid_request_error","code":"content_policy_violation"}}"#;
        let failure = shape_http_failure(StatusCode::BAD_REQUEST, body.to_string(), None);
        assert!(matches!(failure, BackendFailure::ContentRejected(_)));
    }

    #[test]
    fn test_shape_http_failure_passes_status_through() {
        let body = r#"{"error":{"message":"Invalid API key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let failure = shape_http_failure(StatusCode::UNAUTHORIZED, body.to_string(), None);

        assert_eq!(
            failure,
            BackendFailure::Http {
                status: 401,
                message: "Invalid API key".to_string(),
                retry_after_secs: None,
            }
        );
    }

    #[test]
    fn test_extract_response_with_usage() {
        let raw = r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"prompt_tokens":5,"completion_tokens":9,"total_tokens":14}}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let response = extract_response(parsed).unwrap();

        assert_eq!(response.text, "hi");
        assert_eq!(response.usage.total_units, 14);
    }

    #[test]
    fn test_extract_response_without_choices_is_malformed() {
        let raw = r#"{"choices":[]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            extract_response(parsed),
            Err(BackendFailure::MalformedResponse(_))
        ));
    }
}
