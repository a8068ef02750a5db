//! Mock completion provider for testing and offline development.

use crate::client::{ChatClient, ChatCompletion, ChatRequest, ChatUsage};
use faqchat_core::AppResult;

/// Deterministic mock client that echoes the final user turn.
///
/// Because the query engine embeds the retrieved context into the user
/// turn, the echo makes the full composed prompt observable in tests and
/// lets the whole pipeline run end to end without credentials.
pub struct MockChatClient;

impl MockChatClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatClient for MockChatClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatCompletion> {
        tracing::debug!(
            "Mock completion for {} history turns",
            request.history.len()
        );

        Ok(ChatCompletion {
            content: request.user.clone(),
            model: "mock".to_string(),
            usage: ChatUsage::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_user_turn() {
        let client = MockChatClient::new();
        let request = ChatRequest::new("CONTEXT: facts\n\nQUESTION: what?", "ignored");

        let completion = client.complete(&request).await.unwrap();
        assert_eq!(completion.content, request.user);
        assert_eq!(completion.model, "mock");
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let client = MockChatClient::new();
        let request = ChatRequest::new("same input", "ignored");

        let first = client.complete(&request).await.unwrap();
        let second = client.complete(&request).await.unwrap();
        assert_eq!(first.content, second.content);
    }
}
