//! Stats command handler.
//!
//! Shows vector index statistics.

use clap::Args;
use faqchat_core::{AppConfig, AppResult};
use faqchat_retrieval::VectorIndex;

/// Show vector index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index = super::open_index(config)?;
        let stats = index.stats().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Index: {:?}", config.index_path);
            println!("  Records: {}", stats.count);
            println!("  Dimension: {}", stats.dimension);
            for (kind, count) in &stats.namespaces {
                println!("  {}: {}", kind, count);
            }
        }

        Ok(())
    }
}
