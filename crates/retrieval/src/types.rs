//! Core data model for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the FAQ corpus, the source of truth for ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Which side of a FAQ pair a vector record was embedded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Question,
    Answer,
}

impl RecordKind {
    /// Stable storage name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Question => "question",
            RecordKind::Answer => "answer",
        }
    }

    /// Parse a stored kind name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question" => Some(RecordKind::Question),
            "answer" => Some(RecordKind::Answer),
            _ => None,
        }
    }
}

/// Metadata stored alongside every embedding.
///
/// `text` is the embedded side of the pair, `paired_text` the other side,
/// so a retrieval hit always carries the complete question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub kind: RecordKind,
    pub text: String,
    pub paired_text: String,
}

impl RecordMetadata {
    /// Orient the pair as (question, answer) regardless of which side was
    /// embedded.
    pub fn question_answer(&self) -> (&str, &str) {
        match self.kind {
            RecordKind::Question => (&self.text, &self.paired_text),
            RecordKind::Answer => (&self.paired_text, &self.text),
        }
    }
}

/// A vector with its id and metadata, as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique id across the whole ingestion run (e.g., "q3" / "a3")
    pub id: String,

    /// Embedding of `metadata.text`
    pub embedding: Vec<f32>,

    /// Kind, embedded text, and the paired text
    pub metadata: RecordMetadata,
}

impl VectorRecord {
    /// Build the question-side record for a FAQ entry.
    pub fn question(id: impl Into<String>, embedding: Vec<f32>, entry: &FaqEntry) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: RecordMetadata {
                kind: RecordKind::Question,
                text: entry.question.clone(),
                paired_text: entry.answer.clone(),
            },
        }
    }

    /// Build the answer-side record for a FAQ entry.
    pub fn answer(id: impl Into<String>, embedding: Vec<f32>, entry: &FaqEntry) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: RecordMetadata {
                kind: RecordKind::Answer,
                text: entry.answer.clone(),
                paired_text: entry.question.clone(),
            },
        }
    }
}

/// One hit of a top-k similarity search, ranked descending by score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The embedded text of the matching record
    pub text: String,

    /// Cosine similarity to the query vector
    pub score: f32,

    /// Record metadata (kind plus the full question/answer pair)
    pub metadata: RecordMetadata,
}

/// Statistics about a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total records stored
    pub count: u64,

    /// Vector dimension of the index
    pub dimension: usize,

    /// Record counts per kind
    pub namespaces: HashMap<String, u64>,
}

/// Summary returned by an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// FAQ entries processed
    pub entries: usize,

    /// Vector records written (two per entry)
    pub vectors: usize,

    /// Batches flushed to the index
    pub batches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> FaqEntry {
        FaqEntry {
            question: "What is X?".to_string(),
            answer: "X is Y.".to_string(),
        }
    }

    #[test]
    fn test_record_kind_round_trip() {
        assert_eq!(RecordKind::parse("question"), Some(RecordKind::Question));
        assert_eq!(RecordKind::parse("answer"), Some(RecordKind::Answer));
        assert_eq!(RecordKind::parse("chunk"), None);
        assert_eq!(RecordKind::Question.as_str(), "question");
    }

    #[test]
    fn test_question_record_pairs_answer() {
        let record = VectorRecord::question("q0", vec![0.0; 4], &entry());
        assert_eq!(record.metadata.kind, RecordKind::Question);
        assert_eq!(record.metadata.text, "What is X?");
        assert_eq!(record.metadata.paired_text, "X is Y.");
    }

    #[test]
    fn test_pair_orientation_is_kind_independent() {
        let q = VectorRecord::question("q0", vec![0.0; 4], &entry());
        let a = VectorRecord::answer("a0", vec![0.0; 4], &entry());

        assert_eq!(q.metadata.question_answer(), ("What is X?", "X is Y."));
        assert_eq!(a.metadata.question_answer(), ("What is X?", "X is Y."));
    }
}
