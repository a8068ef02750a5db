//! Command handlers for the faqchat CLI.
//!
//! This module organizes all CLI commands into separate submodules and
//! provides shared wiring from configuration to pipeline components.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod serve;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;

use faqchat_core::{AppConfig, AppResult};
use faqchat_llm::ChatClient;
use faqchat_retrieval::{
    create_provider, EmbeddingConfig, EmbeddingProvider, QueryEngine, SqliteIndex, VectorIndex,
};
use std::sync::Arc;

/// Open the configured SQLite index.
pub(crate) fn open_index(config: &AppConfig) -> AppResult<Arc<SqliteIndex>> {
    config.ensure_index_dir()?;
    let index = SqliteIndex::open(&config.index_path, config.embedding_dimension)?;
    Ok(Arc::new(index))
}

/// Build the embedding provider from configuration.
pub(crate) fn embedding_provider(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let embedding_config = EmbeddingConfig {
        provider: config.provider.clone(),
        model: config.embedding_model.clone(),
        dimensions: config.embedding_dimension,
        endpoint: config.endpoint.clone(),
        api_key: config.api_key.clone(),
    };

    create_provider(&embedding_config)
}

/// Build the completion client from configuration.
pub(crate) fn chat_client(config: &AppConfig) -> AppResult<Arc<dyn ChatClient>> {
    faqchat_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )
}

/// Wire the full query engine from configuration.
///
/// Validates the configuration first, so credential problems surface
/// before any provider call.
pub(crate) fn build_engine(config: &AppConfig) -> AppResult<Arc<QueryEngine>> {
    config.validate()?;

    let embedder = embedding_provider(config)?;
    let index = open_index(config)?;
    let chat = chat_client(config)?;

    let engine = QueryEngine::new(
        embedder,
        index as Arc<dyn VectorIndex>,
        chat,
        config.completion_model.as_str(),
    )
    .with_top_k(config.top_k);

    Ok(Arc::new(engine))
}
