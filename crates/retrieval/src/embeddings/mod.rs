//! Embedding generation for FAQ entries and queries.
//!
//! Provides a provider-agnostic embedding adapter with OpenAI and mock
//! implementations.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingConfig, EmbeddingProvider};
