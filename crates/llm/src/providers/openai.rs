//! OpenAI chat completions provider.
//!
//! Implements the completion adapter against the OpenAI REST API.
//! API reference: https://platform.openai.com/docs/api-reference/chat

use crate::client::{ChatClient, ChatCompletion, ChatRequest, ChatUsage};
use faqchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Chat completions endpoint path.
const COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI wire-format message.
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Error payload returned by the OpenAI API.
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// OpenAI chat completion client.
pub struct OpenAiChatClient {
    /// Base URL for the OpenAI API
    base_url: String,

    /// Bearer token for authentication
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiChatClient {
    /// Create a new client against the default OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(api_key, DEFAULT_OPENAI_URL)
    }

    /// Create a new client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Completion(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert a ChatRequest into the OpenAI wire format.
    ///
    /// Message order is fixed: system first, then prior history, then the
    /// new user turn last.
    fn to_openai_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);

        if let Some(ref system) = request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        for turn in &request.history {
            messages.push(OpenAiMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }

        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        OpenAiRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert an OpenAI response to a ChatCompletion.
    fn convert_response(&self, response: OpenAiResponse) -> AppResult<ChatCompletion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Completion("OpenAI returned no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| ChatUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(ChatCompletion {
            content: choice.message.content,
            model: response.model,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiChatClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatCompletion> {
        tracing::info!("Sending completion request to OpenAI");
        tracing::debug!(
            "Model: {}, history turns: {}",
            request.model,
            request.history.len()
        );

        let openai_request = self.to_openai_request(request);
        let url = format!("{}{}", self.base_url, COMPLETIONS_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(&error_text) {
                return Err(AppError::Completion(format!(
                    "OpenAI API error ({}): {}",
                    status, error_response.error.message
                )));
            }

            return Err(AppError::Completion(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Failed to parse OpenAI response: {}", e)))?;

        tracing::info!("Received completion from OpenAI");

        self.convert_response(openai_response)
    }
}
