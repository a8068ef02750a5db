//! FAQ corpus loading and shape validation.
//!
//! The corpus file is a JSON document `{"faqs": [{"question", "answer"}]}`.
//! Shape validation happens here, before any provider call, so a malformed
//! file never costs an embedding request.

use crate::types::FaqEntry;
use faqchat_core::{AppError, AppResult};
use std::path::Path;

/// Load and validate a FAQ corpus from a JSON file.
pub fn load_corpus(path: &Path) -> AppResult<Vec<FaqEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::MalformedCorpus(format!("Failed to read corpus file {:?}: {}", path, e))
    })?;

    parse_corpus(&contents)
}

/// Parse and validate a FAQ corpus from a JSON string.
///
/// The expected shape is `{"faqs": [{"question": "...", "answer": "..."}]}`
/// with a non-empty array and non-blank strings throughout.
pub fn parse_corpus(contents: &str) -> AppResult<Vec<FaqEntry>> {
    let document: serde_json::Value = serde_json::from_str(contents)
        .map_err(|e| AppError::MalformedCorpus(format!("Invalid JSON: {}", e)))?;

    let faqs = document
        .get("faqs")
        .ok_or_else(|| AppError::MalformedCorpus("Missing \"faqs\" key".to_string()))?;

    let items = faqs.as_array().ok_or_else(|| {
        AppError::MalformedCorpus("\"faqs\" must be an array of question/answer pairs".to_string())
    })?;

    if items.is_empty() {
        return Err(AppError::MalformedCorpus(
            "Corpus contains no FAQ entries".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let question = string_field(item, "question", i)?;
        let answer = string_field(item, "answer", i)?;
        entries.push(FaqEntry { question, answer });
    }

    tracing::debug!("Parsed corpus with {} FAQ entries", entries.len());

    Ok(entries)
}

/// Extract a required non-blank string field from a corpus entry.
fn string_field(item: &serde_json::Value, field: &str, index: usize) -> AppResult<String> {
    let value = item
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::MalformedCorpus(format!(
                "Entry {} is missing a string \"{}\" field",
                index, field
            ))
        })?;

    if value.trim().is_empty() {
        return Err(AppError::MalformedCorpus(format!(
            "Entry {} has a blank \"{}\" field",
            index, field
        )));
    }

    Ok(value.to_string())
}
