//! Ask command handler.
//!
//! Answers a single question against the FAQ index, with no prior
//! conversation history.

use clap::Args;
use faqchat_core::{AppConfig, AppResult};
use faqchat_retrieval::AnswerEngine;

/// Ask a single question against the index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Show the retrieved source documents
    #[arg(long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let engine = super::build_engine(config)?;

        let answer = engine.answer(&self.query, &[]).await?;

        if self.json {
            let output = serde_json::json!({
                "text": answer.text,
                "sources": answer.sources,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer.text);

            if self.sources {
                println!();
                if answer.sources.is_empty() {
                    println!("Sources: (none)");
                } else {
                    println!("Sources:");
                    for source in &answer.sources {
                        let (question, _) = source.metadata.question_answer();
                        println!(
                            "- {} ({}, score {:.3})",
                            question,
                            source.metadata.kind.as_str(),
                            source.score
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
