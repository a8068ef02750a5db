//! Route definitions and handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use faqchat_llm::{ChatMessage, Role};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body for the chat endpoint.
///
/// `query` is required. `history` is optional because the server holds no
/// conversation state; clients that want multi-turn grounding send their
/// own thread history along with each query.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    query: Option<String>,

    #[serde(default)]
    history: Vec<HistoryTurn>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryTurn {
    role: Role,
    text: String,
}

/// Create the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check.
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Answer one query against the FAQ index.
async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<impl IntoResponse, ApiError> {
    let query = body
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Request body must contain a non-empty \"query\""))?;

    let history: Vec<ChatMessage> = body
        .history
        .iter()
        .map(|turn| ChatMessage {
            role: turn.role,
            content: turn.text.clone(),
        })
        .collect();

    tracing::info!("Processing query ({} history turns)", history.len());

    let answer = state.engine.answer(query, &history).await?;

    Ok(Json(json!({
        "response": {
            "text": answer.text,
            "sources": answer.sources,
        }
    })))
}
