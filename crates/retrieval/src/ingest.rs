//! FAQ corpus ingestion pipeline.
//!
//! Embeds each entry's question and answer independently and upserts the
//! resulting vector records into the index in bounded-size batches.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::{FaqEntry, IngestReport, VectorRecord};
use faqchat_core::{AppError, AppResult};
use std::sync::Arc;

/// Default number of FAQ entries per batch.
///
/// Bounds peak memory and keeps a single upsert call within provider
/// payload limits.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Ingestion pipeline: corpus in, vector records out.
///
/// Stateless apart from its collaborators; safe to call concurrently,
/// though overlapping runs against the same index share the overwrite
/// semantics described on [`ingest`](IngestPipeline::ingest).
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl IngestPipeline {
    /// Create a pipeline with the default batch size.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ingest a FAQ corpus into the vector index.
    ///
    /// Each entry yields two records, `q<i>` for the question and `a<i>`
    /// for the answer, with ids derived from a running counter across the
    /// whole run, so re-ingesting the same corpus overwrites in place.
    /// Re-ingesting a reordered corpus without clearing the index first
    /// collides ids across runs; callers must reset the index before
    /// ingesting a changed corpus.
    ///
    /// An embedding failure aborts the run (remaining batches are not
    /// attempted) and names the entry that failed; there is no partial
    /// silent skip.
    pub async fn ingest(&self, corpus: &[FaqEntry]) -> AppResult<IngestReport> {
        validate_corpus(corpus)?;

        let batch_count = corpus.len().div_ceil(self.batch_size);

        tracing::info!(
            "Ingesting {} FAQ entries in {} batches of up to {} (provider '{}', model '{}')",
            corpus.len(),
            batch_count,
            self.batch_size,
            self.embedder.provider_name(),
            self.embedder.model_name(),
        );

        let mut processed = 0usize;
        let mut vectors_written = 0usize;

        for (batch_index, batch) in corpus.chunks(self.batch_size).enumerate() {
            let mut records = Vec::with_capacity(batch.len() * 2);

            for (offset, entry) in batch.iter().enumerate() {
                let item = processed + offset;

                let question_embedding = self
                    .embedder
                    .embed(&entry.question)
                    .await
                    .map_err(|e| item_failure(item, "question", &e))?;

                let answer_embedding = self
                    .embedder
                    .embed(&entry.answer)
                    .await
                    .map_err(|e| item_failure(item, "answer", &e))?;

                records.push(VectorRecord::question(
                    format!("q{}", item),
                    question_embedding,
                    entry,
                ));
                records.push(VectorRecord::answer(
                    format!("a{}", item),
                    answer_embedding,
                    entry,
                ));
            }

            // One upsert per batch
            self.index.upsert(&records).await?;

            processed += batch.len();
            vectors_written += records.len();

            tracing::info!(
                "Batch {}/{} done: {}/{} entries processed",
                batch_index + 1,
                batch_count,
                processed,
                corpus.len()
            );
        }

        tracing::info!(
            "Ingestion complete: {} entries, {} vectors",
            processed,
            vectors_written
        );

        Ok(IngestReport {
            entries: processed,
            vectors: vectors_written,
            batches: batch_count,
        })
    }
}

/// Validate the corpus before any provider call is made.
fn validate_corpus(corpus: &[FaqEntry]) -> AppResult<()> {
    if corpus.is_empty() {
        return Err(AppError::MalformedCorpus(
            "Corpus contains no FAQ entries".to_string(),
        ));
    }

    for (i, entry) in corpus.iter().enumerate() {
        if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
            return Err(AppError::MalformedCorpus(format!(
                "Entry {} has a blank question or answer",
                i
            )));
        }
    }

    Ok(())
}

/// Wrap an embedding error with the item that failed.
fn item_failure(item: usize, side: &str, err: &AppError) -> AppError {
    AppError::Embedding(format!("entry {} ({} side): {}", item, side, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockEmbeddings;
    use crate::index::SqliteIndex;
    use crate::types::RecordKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder that counts calls and can be told to fail on one text.
    #[derive(Debug)]
    struct CountingEmbedder {
        calls: AtomicUsize,
        fail_on: Option<String>,
        dimensions: usize,
    }

    impl CountingEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
                dimensions,
            }
        }

        fn failing_on(text: &str, dimensions: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(text.to_string()),
                dimensions,
            }
        }
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
            self.dimensions
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(texts.len(), Ordering::SeqCst);

            if let Some(ref fail_on) = self.fail_on {
                if texts.iter().any(|t| t == fail_on) {
                    return Err(AppError::Embedding("provider unavailable".to_string()));
                }
            }

            Ok(texts.iter().map(|_| vec![0.1; self.dimensions]).collect())
        }
    }

    fn corpus(n: usize) -> Vec<FaqEntry> {
        (0..n)
            .map(|i| FaqEntry {
                question: format!("Question number {}?", i),
                answer: format!("Answer number {}.", i),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_ingest_writes_two_records_per_entry() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline = IngestPipeline::new(embedder, Arc::clone(&index) as Arc<dyn VectorIndex>);

        let report = pipeline.ingest(&corpus(7)).await.unwrap();

        assert_eq!(report.entries, 7);
        assert_eq!(report.vectors, 14);
        assert_eq!(report.batches, 1);

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 14);
        assert_eq!(stats.namespaces.get("question"), Some(&7));
        assert_eq!(stats.namespaces.get("answer"), Some(&7));
    }

    #[tokio::test]
    async fn test_ingest_batches_by_size() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline = IngestPipeline::new(embedder, index).with_batch_size(10);

        let report = pipeline.ingest(&corpus(25)).await.unwrap();

        assert_eq!(report.entries, 25);
        assert_eq!(report.vectors, 50);
        assert_eq!(report.batches, 3);
    }

    #[tokio::test]
    async fn test_ids_are_unique_across_batches() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline =
            IngestPipeline::new(embedder, Arc::clone(&index) as Arc<dyn VectorIndex>)
                .with_batch_size(2);

        pipeline.ingest(&corpus(5)).await.unwrap();

        // 5 entries over 3 batches: ids q0..q4 / a0..a4 must not collide
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 10);
    }

    #[tokio::test]
    async fn test_reingest_same_corpus_overwrites() {
        let embedder = Arc::new(MockEmbeddings::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline = IngestPipeline::new(embedder, Arc::clone(&index) as Arc<dyn VectorIndex>);

        pipeline.ingest(&corpus(3)).await.unwrap();
        pipeline.ingest(&corpus(3)).await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 6);
    }

    #[tokio::test]
    async fn test_empty_corpus_fails_before_any_embedding() {
        let embedder = Arc::new(CountingEmbedder::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline =
            IngestPipeline::new(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>, index);

        let err = pipeline.ingest(&[]).await.unwrap_err();
        assert_eq!(err.kind(), "MalformedCorpus");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_entry_fails_before_any_embedding() {
        let embedder = Arc::new(CountingEmbedder::new(64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline =
            IngestPipeline::new(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>, index);

        let bad = vec![FaqEntry {
            question: "What is X?".to_string(),
            answer: "   ".to_string(),
        }];

        let err = pipeline.ingest(&bad).await.unwrap_err();
        assert_eq!(err.kind(), "MalformedCorpus");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_and_names_the_item() {
        let embedder = Arc::new(CountingEmbedder::failing_on("Answer number 2.", 64));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline = IngestPipeline::new(
            Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>,
            Arc::clone(&index) as Arc<dyn VectorIndex>,
        )
        .with_batch_size(2);

        let err = pipeline.ingest(&corpus(6)).await.unwrap_err();

        assert_eq!(err.kind(), "EmbeddingFailure");
        assert!(err.to_string().contains("entry 2"));
        assert!(err.to_string().contains("answer side"));

        // The failing batch (entries 2-3) was never flushed; only the
        // first full batch landed.
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 4);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        let embedder = Arc::new(MockEmbeddings::new(32));
        let index = Arc::new(SqliteIndex::in_memory(64).unwrap());
        let pipeline = IngestPipeline::new(embedder, index);

        let err = pipeline.ingest(&corpus(1)).await.unwrap_err();
        assert_eq!(err.kind(), "IndexFailure");
    }
}
