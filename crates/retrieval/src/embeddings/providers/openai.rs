//! OpenAI embedding provider.
//!
//! Calls the OpenAI embeddings API (models like text-embedding-3-small).
//! The API accepts a batch of inputs per request, so one ingestion batch
//! still costs one HTTP call per text side.

use crate::embeddings::provider::{EmbeddingConfig, EmbeddingProvider};
use faqchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Embeddings endpoint path.
const EMBEDDINGS_ENDPOINT: &str = "/v1/embeddings";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request payload for the OpenAI embeddings API.
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    /// Model name to use
    model: String,
    /// Texts to embed
    input: Vec<String>,
}

/// Response from the OpenAI embeddings API.
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Error payload returned by the OpenAI API.
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// API base URL
    base_url: String,
    /// Bearer token for authentication
    api_key: String,
    /// Model name (e.g., "text-embedding-3-small")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

impl OpenAiEmbeddings {
    /// Create a new OpenAI embedding provider from configuration.
    ///
    /// # Errors
    /// * `AppError::Config` - If the API key is missing
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires an API key".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for OpenAI: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Send one embeddings request for a batch of texts.
    async fn request_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}{}", self.base_url, EMBEDDINGS_ENDPOINT);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        debug!("Sending embedding request for {} texts to {}", texts.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::Embedding(format!(
                    "OpenAI API error ({}): {}",
                    status, error_response.error.message
                )));
            }

            return Err(AppError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse OpenAI response: {}", e)))?;

        if response_body.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                response_body.data.len(),
                texts.len()
            )));
        }

        // Result order follows the per-item index field, not arrival order
        let mut data = response_body.data;
        data.sort_by_key(|d| d.index);

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimensions {
                return Err(AppError::Embedding(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    item.embedding.len(),
                    self.dimensions
                )));
            }
            embeddings.push(item.embedding);
        }

        debug!("Generated {} embeddings of dimension {}", embeddings.len(), self.dimensions);

        Ok(embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::Embedding("Cannot embed empty text".to_string()));
        }

        self.request_embeddings(texts).await
    }
}
