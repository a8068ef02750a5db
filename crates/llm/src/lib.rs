//! Completion integration crate for the faqchat service.
//!
//! This crate provides a provider-agnostic abstraction for chat
//! completions. Requests carry the three prompt segments (system
//! instruction, history, user turn) separately so providers can map them
//! onto their native message formats.
//!
//! # Providers
//! - **OpenAI**: chat completions API (default)
//! - **Mock**: deterministic echo client for tests and offline use

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, ChatUsage, Role};
pub use factory::create_client;
pub use providers::{MockChatClient, OpenAiChatClient};
