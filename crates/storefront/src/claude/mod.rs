//! Anthropic Messages API integration.
//!
//! The storefront uses a generative model for two things: machine
//! translation of catalog text and the curator chat. Both go through the
//! [`TextGenerator`] trait so they can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_storefront::claude::{ClaudeClient, Message, TextGenerator};
//!
//! let client = ClaudeClient::new(&config.claude)?;
//! let reply = client
//!     .generate(Some("Answer briefly."), &[Message::user("What is ikat?")])
//!     .await?;
//! ```

mod client;
mod error;
mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, Role, StopReason, Usage};

use async_trait::async_trait;

/// Something that turns an instruction plus a conversation into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to `messages`, steered by the optional `system` prompt.
    ///
    /// Returns the concatenated text of the reply.
    async fn generate(
        &self,
        system: Option<&str>,
        messages: &[Message],
    ) -> Result<String, ClaudeError>;
}
