//! Configuration management for the faqchat service.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Built-in defaults
//! - Config files (.faqchat/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. Provider credentials are validated up front so a
//! misconfigured deployment fails before the first network call.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default completion model, matching the OpenAI chat completions API.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Default embedding model and its native output dimension.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default vector dimension (must match the embedding model output).
pub const DEFAULT_DIMENSION: usize = 1536;

/// Default number of documents retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Default ingestion batch size.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Main application configuration.
///
/// This struct holds all global options that affect behavior across the
/// ingestion pipeline, the query engine, and the serving surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Provider backing both embeddings and completions ("openai", "mock")
    pub provider: String,

    /// Completion model identifier
    pub completion_model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Vector dimension of the index and the embedding model
    pub embedding_dimension: usize,

    /// Number of documents retrieved per query
    pub top_k: usize,

    /// Ingestion batch size
    pub batch_size: usize,

    /// Path to the SQLite vector index
    pub index_path: PathBuf,

    /// Optional provider endpoint override
    pub endpoint: Option<String>,

    /// API key for the provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    provider: Option<String>,
    models: Option<ModelsConfig>,
    retrieval: Option<RetrievalConfig>,
    ingestion: Option<IngestionConfig>,
    index: Option<IndexConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelsConfig {
    completion: Option<String>,
    embedding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalConfig {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    dimension: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IngestionConfig {
    #[serde(rename = "batchSize")]
    batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "openai".to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_DIMENSION,
            top_k: DEFAULT_TOP_K,
            batch_size: DEFAULT_BATCH_SIZE,
            index_path: PathBuf::from(".faqchat/index.db"),
            endpoint: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `FAQCHAT_CONFIG`: Path to config file
    /// - `FAQCHAT_PROVIDER`: Provider name ("openai", "mock")
    /// - `FAQCHAT_COMPLETION_MODEL`: Completion model identifier
    /// - `FAQCHAT_EMBEDDING_MODEL`: Embedding model identifier
    /// - `FAQCHAT_INDEX`: Path to the vector index
    /// - `OPENAI_API_KEY`: Provider API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("FAQCHAT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(".faqchat/config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("FAQCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("FAQCHAT_COMPLETION_MODEL") {
            config.completion_model = model;
        }

        if let Ok(model) = std::env::var("FAQCHAT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if let Ok(index) = std::env::var("FAQCHAT_INDEX") {
            config.index_path = PathBuf::from(index);
        }

        config.api_key = std::env::var("OPENAI_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(provider) = config_file.provider {
            result.provider = provider;
        }

        if let Some(models) = config_file.models {
            if let Some(completion) = models.completion {
                result.completion_model = completion;
            }
            if let Some(embedding) = models.embedding {
                result.embedding_model = embedding;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
            if let Some(dimension) = retrieval.dimension {
                result.embedding_dimension = dimension;
            }
        }

        if let Some(ingestion) = config_file.ingestion {
            if let Some(batch_size) = ingestion.batch_size {
                result.batch_size = batch_size;
            }
        }

        if let Some(index) = config_file.index {
            if let Some(path) = index.path {
                result.index_path = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        index_path: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.completion_model = model;
        }

        if let Some(index_path) = index_path {
            self.index_path = index_path;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Ensure the directory holding the index exists.
    pub fn ensure_index_dir(&self) -> AppResult<()> {
        if let Some(parent) = self.index_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Config(format!("Failed to create index directory: {}", e))
                })?;
            }
        }
        Ok(())
    }

    /// Validate configuration for the active provider.
    ///
    /// Fails fast on missing credentials or nonsense tunables so no
    /// provider call is ever attempted with a broken configuration.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "mock"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "openai" && self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::Config(
                "Missing required environment variable: OPENAI_API_KEY".to_string(),
            ));
        }

        if self.embedding_dimension == 0 {
            return Err(AppError::Config(
                "Vector dimension must be greater than zero".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "Retrieval top-k must be greater than zero".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Ingestion batch size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
