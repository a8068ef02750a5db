//! SQLite-backed vector index for FAQ records.
//!
//! Embeddings are stored as little-endian f32 BLOBs; similarity search is
//! a full cosine scan, sorted descending and truncated to k. Fine for FAQ
//! corpora, which are small by nature.

use crate::index::VectorIndex;
use crate::types::{IndexStats, RecordKind, RecordMetadata, RetrievalResult, VectorRecord};
use faqchat_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed vector index with a fixed dimension.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    dimension: usize,
}

impl SqliteIndex {
    /// Open (or create) an index database at the given path.
    pub fn open(db_path: &Path, dimension: usize) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Index(format!("Failed to create index directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        Self::init(conn, dimension)
    }

    /// Create an in-memory index (tests and ephemeral runs).
    pub fn in_memory(dimension: usize) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("Failed to open in-memory index: {}", e)))?;

        Self::init(conn, dimension)
    }

    fn init(conn: Connection, dimension: usize) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                text TEXT NOT NULL,
                paired_text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Initialized SQLite index (dimension {})", dimension);

        Ok(Self {
            conn: Mutex::new(conn),
            dimension,
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("Index connection lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()> {
        // Dimension mismatches fail the whole batch before any write
        for record in records {
            if record.embedding.len() != self.dimension {
                return Err(AppError::Index(format!(
                    "Dimension mismatch for record '{}': got {}, index expects {}",
                    record.id,
                    record.embedding.len(),
                    self.dimension
                )));
            }
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to begin transaction: {}", e)))?;

        for record in records {
            tx.execute(
                "INSERT OR REPLACE INTO records (id, kind, text, paired_text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.metadata.kind.as_str(),
                    record.metadata.text,
                    record.metadata.paired_text,
                    embedding_to_bytes(&record.embedding),
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to upsert record: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit upsert: {}", e)))?;

        tracing::debug!("Upserted {} records", records.len());

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<RecordKind>,
    ) -> AppResult<Vec<RetrievalResult>> {
        if vector.len() != self.dimension {
            return Err(AppError::Index(format!(
                "Query vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let conn = self.lock()?;

        let sql = match filter {
            Some(_) => "SELECT kind, text, paired_text, embedding FROM records WHERE kind = ?1",
            None => "SELECT kind, text, paired_text, embedding FROM records",
        };

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, String, Vec<u8>)> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        };

        let rows: Vec<rusqlite::Result<(String, String, String, Vec<u8>)>> = match filter {
            Some(kind) => stmt
                .query_map(params![kind.as_str()], map_row)
                .map_err(|e| AppError::Index(format!("Failed to query records: {}", e)))?
                .collect(),
            None => stmt
                .query_map([], map_row)
                .map_err(|e| AppError::Index(format!("Failed to query records: {}", e)))?
                .collect(),
        };

        let mut results = Vec::new();

        for row in rows {
            let (kind, text, paired_text, embedding_bytes) =
                row.map_err(|e| AppError::Index(format!("Failed to read record: {}", e)))?;

            let kind = RecordKind::parse(&kind)
                .ok_or_else(|| AppError::Index(format!("Unknown record kind: {}", kind)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let score = cosine_similarity(vector, &embedding);

            results.push(RetrievalResult {
                text: text.clone(),
                score,
                metadata: RecordMetadata {
                    kind,
                    text,
                    paired_text,
                },
            });
        }

        // Sort by score descending, then take top-k
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Retrieved {} records (requested top-{})", results.len(), top_k);

        Ok(results)
    }

    async fn stats(&self) -> AppResult<IndexStats> {
        let conn = self.lock()?;

        let count: u64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u64)
            })
            .map_err(|e| AppError::Index(format!("Failed to count records: {}", e)))?;

        let mut stmt = conn
            .prepare("SELECT kind, COUNT(*) FROM records GROUP BY kind")
            .map_err(|e| AppError::Index(format!("Failed to prepare stats query: {}", e)))?;

        let kind_counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })
            .map_err(|e| AppError::Index(format!("Failed to query stats: {}", e)))?;

        let mut namespaces = HashMap::new();
        for entry in kind_counts {
            let (kind, kind_count) =
                entry.map_err(|e| AppError::Index(format!("Failed to read stats: {}", e)))?;
            namespaces.insert(kind, kind_count);
        }

        Ok(IndexStats {
            count,
            dimension: self.dimension,
            namespaces,
        })
    }

    async fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM records", [])
            .map_err(|e| AppError::Index(format!("Failed to delete records: {}", e)))?;

        tracing::info!("Reset vector index");
        Ok(())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FaqEntry;

    fn entry() -> FaqEntry {
        FaqEntry {
            question: "What is X?".to_string(),
            answer: "X is Y.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let index = SqliteIndex::in_memory(3).unwrap();

        let records = vec![
            VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry()),
            VectorRecord::answer("a0", vec![0.0, 1.0, 0.0], &entry()),
        ];
        index.upsert(&records).await.unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 5, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "What is X?");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_with_kind_filter() {
        let index = SqliteIndex::in_memory(3).unwrap();

        index
            .upsert(&[
                VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry()),
                VectorRecord::answer("a0", vec![1.0, 0.0, 0.0], &entry()),
            ])
            .await
            .unwrap();

        let results = index
            .query(&[1.0, 0.0, 0.0], 5, Some(RecordKind::Answer))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.kind, RecordKind::Answer);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = SqliteIndex::in_memory(3).unwrap();

        index
            .upsert(&[VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry())])
            .await
            .unwrap();

        let replacement = FaqEntry {
            question: "What is Z?".to_string(),
            answer: "Z is W.".to_string(),
        };
        index
            .upsert(&[VectorRecord::question("q0", vec![0.0, 1.0, 0.0], &replacement)])
            .await
            .unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 1);

        let results = index.query(&[0.0, 1.0, 0.0], 1, None).await.unwrap();
        assert_eq!(results[0].text, "What is Z?");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        let index = SqliteIndex::in_memory(3).unwrap();

        let result = index
            .upsert(&[VectorRecord::question("q0", vec![1.0, 0.0], &entry())])
            .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), "IndexFailure");

        // Nothing was written
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 0);
    }

    #[tokio::test]
    async fn test_stats_namespaces() {
        let index = SqliteIndex::in_memory(3).unwrap();

        index
            .upsert(&[
                VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry()),
                VectorRecord::question("q1", vec![0.0, 1.0, 0.0], &entry()),
                VectorRecord::answer("a0", vec![0.0, 0.0, 1.0], &entry()),
            ])
            .await
            .unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.dimension, 3);
        assert_eq!(stats.namespaces.get("question"), Some(&2));
        assert_eq!(stats.namespaces.get("answer"), Some(&1));
    }

    #[tokio::test]
    async fn test_reset() {
        let index = SqliteIndex::in_memory(3).unwrap();

        index
            .upsert(&[VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry())])
            .await
            .unwrap();
        index.reset().await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 0);
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.db");

        {
            let index = SqliteIndex::open(&path, 3).unwrap();
            index
                .upsert(&[VectorRecord::question("q0", vec![1.0, 0.0, 0.0], &entry())])
                .await
                .unwrap();
        }

        // Reopen and verify persistence
        let index = SqliteIndex::open(&path, 3).unwrap();
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let embedding = vec![1.5, -0.25, 0.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&c, &d) - 0.0).abs() < 0.001);
    }
}
