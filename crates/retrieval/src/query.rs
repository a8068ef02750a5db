//! Retrieval-augmented query engine.
//!
//! Turns a raw user message into a similarity search, a grounded prompt,
//! and a completion call. The engine is stateless: conversation history is
//! an explicit argument, so concurrent use across independent threads is
//! safe and call order never changes behavior.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::RetrievalResult;
use faqchat_core::{AppError, AppResult};
use faqchat_llm::{ChatClient, ChatMessage, ChatRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of documents retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// System instruction for grounded answering.
///
/// Names "history" as the channel for prior conversational context, so the
/// model treats the retrieved context as scoped to the current question
/// rather than a standing fact.
const SYSTEM_PROMPT: &str = "The following is a friendly conversation between a human and an AI assistant. \
The assistant is helpful and provides specific details from the context it is given. \
If the assistant does not know the answer to a question, it truthfully says it does not \
know instead of inventing one. \
Use the \"history\" of the conversation to understand what has already been discussed. \
Use the CONTEXT below to answer the QUESTION asked by the user.";

/// An answer produced by the engine, with the retrieval results that
/// grounded it (for display or audit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineAnswer {
    /// The generated answer text
    pub text: String,

    /// Retrieval results the prompt was grounded on, best first
    pub sources: Vec<RetrievalResult>,
}

/// Trait for answering a query against accumulated conversation history.
///
/// The conversation state manager and the HTTP boundary depend on this
/// seam rather than on the concrete engine, which keeps failure-path tests
/// cheap.
#[async_trait::async_trait]
pub trait AnswerEngine: Send + Sync {
    /// Answer `query` given the prior `history` turns.
    async fn answer(&self, query: &str, history: &[ChatMessage]) -> AppResult<EngineAnswer>;
}

/// The retrieval-augmented query engine.
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatClient>,
    model: String,
    top_k: usize,
}

impl QueryEngine {
    /// Create an engine with the default top-k.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
            model: model.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the number of documents retrieved per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Retrieve the top-k records most similar to the query.
    ///
    /// Both question- and answer-kind records participate. Embedding and
    /// index errors surface as retrieval failures with the original
    /// message; an ungrounded answer is worse than a visible failure.
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievalResult>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| AppError::Retrieval(format!("query embedding failed: {}", e)))?;

        let results = self
            .index
            .query(&query_embedding, self.top_k, None)
            .await
            .map_err(|e| AppError::Retrieval(format!("index query failed: {}", e)))?;

        tracing::debug!(
            "Retrieved {} records (top score: {:.3})",
            results.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );

        Ok(results)
    }
}

#[async_trait::async_trait]
impl AnswerEngine for QueryEngine {
    async fn answer(&self, query: &str, history: &[ChatMessage]) -> AppResult<EngineAnswer> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidQuery);
        }

        tracing::info!("Answering query with {} history turns", history.len());

        // Step 1: retrieve
        let sources = self.retrieve(query).await?;

        // Step 2: compose the grounded prompt. Segment order is fixed:
        // system instruction, prior history, then one synthetic user turn
        // carrying the serialized context first and the question second.
        let context = build_context(&sources);
        let grounded_turn = build_grounded_turn(&context, query);

        let request = ChatRequest::new(grounded_turn, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_history(history.to_vec())
            .with_temperature(0.0);

        // Step 3: complete
        let completion = self.chat.complete(&request).await?;

        tracing::info!("Generated answer from {} sources", sources.len());

        Ok(EngineAnswer {
            text: completion.content,
            sources,
        })
    }
}

/// Serialize the retrieval result set into a context block.
///
/// Each hit is rendered as its full question/answer pair so the model sees
/// complete facts regardless of which side matched.
fn build_context(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return "(no matching FAQ entries were found)".to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let (question, answer) = result.metadata.question_answer();
            format!(
                "[Match {}] ({}, score {:.3})\nQ: {}\nA: {}",
                i + 1,
                result.metadata.kind.as_str(),
                result.score,
                question,
                answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the synthetic user turn: context first, question second.
///
/// This turn is a scratch artifact of one completion call; callers persist
/// only the original query and the final answer, keeping history free of
/// repeated retrieval payloads.
fn build_grounded_turn(context: &str, query: &str) -> String {
    format!("CONTEXT:\n{}\n\nQUESTION: {}", context, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockEmbeddings;
    use crate::index::SqliteIndex;
    use crate::types::{FaqEntry, RecordKind, RecordMetadata, VectorRecord};
    use faqchat_llm::{ChatCompletion, ChatUsage, MockChatClient};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Chat client that records every request and returns a fixed answer.
    struct RecordingClient {
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> ChatRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatCompletion> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(ChatCompletion {
                content: "recorded answer".to_string(),
                model: "recording".to_string(),
                usage: ChatUsage::default(),
            })
        }
    }

    /// Embedder that counts calls, for zero-provider-call assertions.
    #[derive(Debug)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        fn provider_name(&self) -> &str {
            "counting"
        }

        fn model_name(&self) -> &str {
            "counting-v1"
        }

        fn dimensions(&self) -> usize {
            8
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![0.5; 8]).collect())
        }
    }

    async fn seeded_index(embedder: &dyn EmbeddingProvider) -> Arc<SqliteIndex> {
        let index = Arc::new(SqliteIndex::in_memory(embedder.dimensions()).unwrap());
        let entry = FaqEntry {
            question: "What is the return policy?".to_string(),
            answer: "Returns are accepted within 30 days.".to_string(),
        };

        let q = embedder.embed(&entry.question).await.unwrap();
        let a = embedder.embed(&entry.answer).await.unwrap();
        index
            .upsert(&[
                VectorRecord::question("q0", q, &entry),
                VectorRecord::answer("a0", a, &entry),
            ])
            .await
            .unwrap();

        index
    }

    #[tokio::test]
    async fn test_blank_query_rejected_with_zero_provider_calls() {
        let embedder = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });
        let index = Arc::new(SqliteIndex::in_memory(8).unwrap());
        let chat = Arc::new(RecordingClient::new());

        let engine = QueryEngine::new(
            Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>,
            index,
            Arc::clone(&chat) as Arc<dyn ChatClient>,
            "gpt-3.5-turbo",
        );

        for query in ["", "   ", "\n\t"] {
            let err = engine.answer(query, &[]).await.unwrap_err();
            assert_eq!(err.kind(), "InvalidQuery");
        }

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(chat.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_segments_in_fixed_order() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = seeded_index(embedder.as_ref()).await;
        let chat = Arc::new(RecordingClient::new());

        let engine = QueryEngine::new(
            embedder,
            index,
            Arc::clone(&chat) as Arc<dyn ChatClient>,
            "gpt-3.5-turbo",
        );

        let history = vec![
            ChatMessage::user("Do you ship internationally?"),
            ChatMessage::assistant("Yes, to most countries."),
        ];

        let answer = engine
            .answer("What is the return policy?", &history)
            .await
            .unwrap();
        assert_eq!(answer.text, "recorded answer");

        let request = chat.last_request();

        // System instruction present and grounded
        let system = request.system.unwrap();
        assert!(system.contains("history"));
        assert!(system.contains("CONTEXT"));

        // History precedes the synthetic turn, unchanged
        assert_eq!(request.history, history);

        // Exactly one synthetic turn: history turns carry no context block
        assert!(request.history.iter().all(|m| !m.content.contains("CONTEXT:")));
        assert!(request.user.starts_with("CONTEXT:"));

        // Context first, question second, inside the one synthetic turn
        let context_pos = request.user.find("Returns are accepted").unwrap();
        let question_pos = request.user.find("QUESTION: What is the return policy?").unwrap();
        assert!(context_pos < question_pos);

        // Deterministic grounding
        assert_eq!(request.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_sources_returned_ranked_descending() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = seeded_index(embedder.as_ref()).await;
        let chat = Arc::new(MockChatClient::new());

        let engine = QueryEngine::new(
            embedder,
            index,
            chat,
            "gpt-3.5-turbo",
        );

        let answer = engine.answer("What is the return policy?", &[]).await.unwrap();

        assert_eq!(answer.sources.len(), 2);
        assert!(answer.sources[0].score >= answer.sources[1].score);
        // The matching question record should rank first
        assert_eq!(answer.sources[0].metadata.kind, RecordKind::Question);
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_surfaced() {
        // A mis-dimensioned index makes the search fail
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = Arc::new(SqliteIndex::in_memory(32).unwrap());
        let chat = Arc::new(RecordingClient::new());

        let engine = QueryEngine::new(
            embedder,
            index,
            Arc::clone(&chat) as Arc<dyn ChatClient>,
            "gpt-3.5-turbo",
        );

        let err = engine.answer("anything at all", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "RetrievalFailure");

        // No completion was attempted
        assert!(chat.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_context_empty() {
        let context = build_context(&[]);
        assert!(context.contains("no matching FAQ entries"));
    }

    #[test]
    fn test_build_context_renders_full_pairs() {
        let results = vec![RetrievalResult {
            text: "X is Y.".to_string(),
            score: 0.91,
            metadata: RecordMetadata {
                kind: RecordKind::Answer,
                text: "X is Y.".to_string(),
                paired_text: "What is X?".to_string(),
            },
        }];

        let context = build_context(&results);
        assert!(context.contains("[Match 1]"));
        assert!(context.contains("Q: What is X?"));
        assert!(context.contains("A: X is Y."));
    }

    #[test]
    fn test_grounded_turn_orders_context_before_question() {
        let turn = build_grounded_turn("some facts", "a question?");
        let context_pos = turn.find("some facts").unwrap();
        let question_pos = turn.find("a question?").unwrap();
        assert!(context_pos < question_pos);
    }
}
