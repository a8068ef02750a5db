//! faqchat CLI
//!
//! Main entry point for the faqchat command-line tool. Provides commands
//! for corpus ingestion, one-shot and interactive question answering, the
//! HTTP server, and index statistics.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IngestCommand, ServeCommand, StatsCommand};
use faqchat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// faqchat - retrieval-augmented FAQ answering
#[derive(Parser, Debug)]
#[command(name = "faqchat")]
#[command(about = "Retrieval-augmented FAQ question answering", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "FAQCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Provider for embeddings and completions (openai, mock)
    #[arg(short, long, global = true, env = "FAQCHAT_PROVIDER")]
    provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true, env = "FAQCHAT_COMPLETION_MODEL")]
    model: Option<String>,

    /// Path to the vector index
    #[arg(short, long, global = true, env = "FAQCHAT_INDEX")]
    index: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a FAQ corpus into the vector index
    Ingest(IngestCommand),

    /// Ask a single question against the index
    Ask(AskCommand),

    /// Interactive chat session with conversation threads
    Chat(ChatCommand),

    /// Run the HTTP API server
    Serve(ServeCommand),

    /// Show vector index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.index,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("faqchat starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Index: {:?}", config.index_path);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Serve(_) => "serve",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
