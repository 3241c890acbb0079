//! AnthropicBackend - direct REST implementation of the generation contract.
//!
//! Calls the Anthropic Messages API without CLI dependency.
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

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Backend implementation that talks to the Anthropic HTTP API.
#[derive(Clone)]
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Loads configuration from the secrets file or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/postspark/secrets.toml
    /// 2. Environment variables (ANTHROPIC_API_KEY, ANTHROPIC_MODEL_NAME)
    ///
    /// Model name defaults to `claude-sonnet-4-20250514` if not specified.
    pub fn try_from_env() -> Result<Self, BackendFailure> {
        if let Ok(secrets) = Secrets::load() {
            if let Some(anthropic) = secrets.anthropic {
                let model = anthropic
                    .model
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.into());
                return Ok(Self::new(anthropic.api_key, model));
            }
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            BackendFailure::MissingCredentials(
                "ANTHROPIC_API_KEY not found in ~/.config/postspark/secrets.toml or environment variables"
                    .into(),
            )
        })?;

        let model =
            env::var("ANTHROPIC_MODEL_NAME").unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(
        &self,
        body: &CreateMessageRequest,
    ) -> Result<BackendResponse, BackendFailure> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| BackendFailure::Transport {
                message: format!("Anthropic API request failed: {err}"),
                timeout: err.is_timeout(),
                connect: err.is_connect(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Anthropic error body".to_string());
            return Err(shape_http_failure(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            BackendFailure::MalformedResponse(format!("Failed to parse Anthropic response: {err}"))
        })?;

        extract_response(parsed)
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &PromptRequest) -> Result<BackendResponse, BackendFailure> {
        let request = CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.user.clone(),
            }],
            max_tokens: self.max_tokens,
            system: Some(prompt.system.clone()),
        };

        tracing::debug!(
            "[AnthropicBackend] dispatching generation, model={}",
            self.model
        );
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    r#type: String,
    message: String,
}

fn extract_response(response: CreateMessageResponse) -> Result<BackendResponse, BackendFailure> {
    let text = response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
        })
        .ok_or_else(|| {
            BackendFailure::MalformedResponse(
                "Anthropic API returned no text in the response content".into(),
            )
        })?;

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    Ok(BackendResponse { text, usage })
}

fn shape_http_failure(
    status: StatusCode,
    body: String,
    retry_after_secs: Option<u64>,
) -> BackendFailure {
    let (error_type, message) = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| (wrapper.error.r#type, wrapper.error.message))
        .unwrap_or_else(|_| (String::new(), body.clone()));

    // Anthropic reports moderation refusals as invalid_request_error with a
    // policy-worded message rather than a dedicated status code.
    let lowered = message.to_lowercase();
    if error_type == "invalid_request_error"
        && (lowered.contains("content policy") || lowered.contains("flagged"))
    {
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
    fn test_shape_http_failure_parses_provider_error_body() {
        let body = r#"{"error":{"type":"rate_limit_error","message":"Too many requests"}}"#;
        let failure = shape_http_failure(StatusCode::TOO_MANY_REQUESTS, body.to_string(), Some(7));

        assert_eq!(
            failure,
            BackendFailure::Http {
                status: 429,
                message: "Too many requests".to_string(),
                retry_after_secs: Some(7),
            }
        );
    }

    #[test]
    fn test_shape_http_failure_detects_content_policy() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"Request flagged by content policy"}}"#;
        let failure = shape_http_failure(StatusCode::BAD_REQUEST, body.to_string(), None);
        assert!(matches!(failure, BackendFailure::ContentRejected(_)));
    }

    #[test]
    fn test_shape_http_failure_keeps_unparseable_body() {
        let failure =
            shape_http_failure(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>".into(), None);
        match failure {
            BackendFailure::Http { status, message, .. } => {
                assert_eq!(status, 502);
                assert!(message.contains("bad gateway"));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn test_extract_response_with_usage() {
        let raw = r#"{"content":[{"type":"text","text":"hello"}],"usage":{"input_tokens":12,"output_tokens":34}}"#;
        let parsed: CreateMessageResponse = serde_json::from_str(raw).unwrap();
        let response = extract_response(parsed).unwrap();

        assert_eq!(response.text, "hello");
        assert_eq!(response.usage.prompt_units, 12);
        assert_eq!(response.usage.total_units, 46);
    }

    #[test]
    fn test_extract_response_without_text_is_malformed() {
        let raw = r#"{"content":[]}"#;
        let parsed: CreateMessageResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            extract_response(parsed),
            Err(BackendFailure::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            parse_retry_after(Some(&HeaderValue::from_static("30"))),
            Some(30)
        );
        assert_eq!(
            parse_retry_after(Some(&HeaderValue::from_static("soon"))),
            None
        );
        assert_eq!(parse_retry_after(None), None);
    }
}
