//! Thin HTTP boundary for the faqchat service.
//!
//! One POST endpoint answers FAQ queries; the server holds no conversation
//! state. Conversation memory belongs to clients, which may send their
//! thread history with each request.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

use faqchat_core::{AppError, AppResult};
use std::net::SocketAddr;

/// Bind and serve the HTTP API until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> AppResult<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
