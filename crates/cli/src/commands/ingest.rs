//! Ingest command handler.
//!
//! Reads a FAQ corpus file and writes embedding records to the index.

use clap::Args;
use faqchat_core::{AppConfig, AppResult};
use faqchat_retrieval::{load_corpus, IngestPipeline, VectorIndex};
use std::path::PathBuf;
use std::sync::Arc;

/// Ingest a FAQ corpus into the vector index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Path to the corpus file ({"faqs": [{"question", "answer"}, ...]})
    #[arg(default_value = "data/faq.json")]
    pub corpus: PathBuf,

    /// Clear the index before ingesting.
    ///
    /// Required when the corpus changed or was reordered, because record
    /// ids are positional and would collide with the previous run.
    #[arg(long)]
    pub reset: bool,

    /// Entries per batch (default from config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for corpus {:?}", self.corpus);

        config.validate()?;

        let corpus = load_corpus(&self.corpus)?;
        println!("Found {} FAQ items", corpus.len());

        let embedder = super::embedding_provider(config)?;
        let index = super::open_index(config)?;

        if self.reset {
            tracing::info!("Resetting vector index before ingestion");
            index.reset().await?;
        }

        let pipeline = IngestPipeline::new(embedder, index as Arc<dyn VectorIndex>)
            .with_batch_size(self.batch_size.unwrap_or(config.batch_size));

        let report = pipeline.ingest(&corpus).await?;

        if self.json {
            let output = serde_json::json!({
                "entries": report.entries,
                "vectors": report.vectors,
                "batches": report.batches,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Ingested {} entries ({} vectors) in {} batches",
                report.entries, report.vectors, report.batches
            );
        }

        Ok(())
    }
}
