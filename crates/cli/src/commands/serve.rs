//! Serve command handler.
//!
//! Runs the HTTP API server.

use clap::Args;
use faqchat_core::{AppConfig, AppResult};
use faqchat_server::AppState;
use std::net::SocketAddr;

/// Run the HTTP API server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting HTTP server on {}", self.addr);

        let engine = super::build_engine(config)?;
        let state = AppState { engine };

        faqchat_server::serve(self.addr, state).await
    }
}
