//! Error types for the faqchat service.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, corpus ingestion, the three provider
//! boundaries (embedding, index, completion), query validation, and
//! conversation-thread invariants.

use thiserror::Error;

/// Unified error type for the faqchat service.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration (credentials, index path, models).
    /// Fatal, raised before any network call is made.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The FAQ corpus does not match the expected shape. Fatal per run,
    /// raised before any provider call is made.
    #[error("Malformed corpus: {0}")]
    MalformedCorpus(String),

    /// Embedding provider errors, surfaced with the provider message.
    #[error("Embedding failure: {0}")]
    Embedding(String),

    /// Vector index errors (upsert, query, stats).
    #[error("Index failure: {0}")]
    Index(String),

    /// Retrieval step failures in the query engine: a failed query
    /// embedding or a failed index search. An ungrounded answer is worse
    /// than a visible failure, so these are surfaced, never degraded.
    #[error("Retrieval failure: {0}")]
    Retrieval(String),

    /// Completion provider errors, surfaced with the provider message.
    #[error("Completion failure: {0}")]
    Completion(String),

    /// Empty or whitespace-only query. Rejected locally, no provider call.
    #[error("Query must not be empty")]
    InvalidQuery,

    /// Attempted to delete the only remaining conversation thread.
    #[error("Cannot delete the last remaining thread")]
    LastThread,

    /// Conversation thread id does not exist.
    #[error("Unknown thread: {0}")]
    UnknownThread(u64),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Stable classification tag for each error category.
    ///
    /// Used in HTTP error bodies and logs so callers can diagnose a failure
    /// without parsing the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigurationError",
            AppError::MalformedCorpus(_) => "MalformedCorpus",
            AppError::Embedding(_) => "EmbeddingFailure",
            AppError::Index(_) => "IndexFailure",
            AppError::Retrieval(_) => "RetrievalFailure",
            AppError::Completion(_) => "CompletionFailure",
            AppError::InvalidQuery => "InvalidQuery",
            AppError::LastThread => "LastThreadError",
            AppError::UnknownThread(_) => "UnknownThread",
            AppError::Io(_) => "IoError",
            AppError::Serialization(_) => "SerializationError",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_stable() {
        assert_eq!(AppError::InvalidQuery.kind(), "InvalidQuery");
        assert_eq!(AppError::LastThread.kind(), "LastThreadError");
        assert_eq!(
            AppError::Retrieval("index offline".to_string()).kind(),
            "RetrievalFailure"
        );
        assert_eq!(
            AppError::Config("missing key".to_string()).kind(),
            "ConfigurationError"
        );
    }

    #[test]
    fn test_display_preserves_provider_message() {
        let err = AppError::Completion("model overloaded".to_string());
        assert!(err.to_string().contains("model overloaded"));
    }
}
