//! Completion provider factory.
//!
//! This module creates chat clients based on application configuration.
//! It handles provider resolution and credential checks before any
//! network call is attempted.

use crate::client::ChatClient;
use crate::providers::{MockChatClient, OpenAiChatClient};
use faqchat_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a chat client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for providers that need one)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// credential is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;

            let client = match endpoint {
                Some(url) => OpenAiChatClient::with_base_url(api_key, url)?,
                None => OpenAiChatClient::new(api_key)?,
            };
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockChatClient::new())),
        _ => Err(AppError::Config(format!(
            "Unknown completion provider: {}",
            provider
        ))),
    }
}
