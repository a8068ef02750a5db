//! Vector index abstraction for FAQ records.
//!
//! Defines a trait for provider-agnostic vector storage and retrieval.

pub mod sqlite;

pub use sqlite::SqliteIndex;

use crate::types::{IndexStats, RecordKind, RetrievalResult, VectorRecord};
use faqchat_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Upserting records with embeddings (insert-or-overwrite by id)
/// - Top-k similarity search with an optional kind filter
/// - Collecting statistics
/// - Resetting/clearing the index
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or update a batch of records in the index.
    ///
    /// Every embedding must match the index dimension; a mismatch fails
    /// the whole call.
    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()>;

    /// Search for the top-k records most similar to the query vector.
    ///
    /// Returns results ordered by descending similarity score. When
    /// `filter` is set, only records of that kind are considered.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<RecordKind>,
    ) -> AppResult<Vec<RetrievalResult>>;

    /// Get statistics about the index.
    async fn stats(&self) -> AppResult<IndexStats>;

    /// Reset the index, removing all records.
    async fn reset(&self) -> AppResult<()>;
}
