//! Shared server state.

use faqchat_retrieval::AnswerEngine;
use std::sync::Arc;

/// State shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The retrieval-augmented query engine
    pub engine: Arc<dyn AnswerEngine>,
}
