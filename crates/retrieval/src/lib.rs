//! Retrieval-augmented answering for FAQ corpora.
//!
//! This crate holds the core pipeline: corpus ingestion (embed + upsert in
//! batches), the vector index abstraction with a SQLite backend, and the
//! query engine that retrieves context, composes a grounded prompt, and
//! calls the completion provider.

pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod query;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use corpus::{load_corpus, parse_corpus};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{SqliteIndex, VectorIndex};
pub use ingest::{IngestPipeline, DEFAULT_BATCH_SIZE};
pub use query::{AnswerEngine, EngineAnswer, QueryEngine, DEFAULT_TOP_K};
pub use types::{
    FaqEntry, IndexStats, IngestReport, RecordKind, RecordMetadata, RetrievalResult, VectorRecord,
};
