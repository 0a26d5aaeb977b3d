//! Messaging platform adapters
//!
//! The relay talks to the chat platform through the [`Messenger`] trait:
//! fetching the binary content of an inbound message and replying to it.

pub mod line;

use async_trait::async_trait;
use serde::Serialize;

pub use line::LineClient;

use crate::Result;

/// Binary content attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Raw bytes
    pub data: Vec<u8>,

    /// MIME type reported by the platform
    pub content_type: String,
}

/// An outbound message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// Plain text message
    Text { text: String },
}

impl OutgoingMessage {
    /// Create a `text` message
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text body of the message
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Chat platform operations used by the relay
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Download the binary content of a message (images, files)
    ///
    /// # Errors
    ///
    /// Returns error if the platform is unreachable or rejects the request
    async fn fetch_content(&self, message_id: &str) -> Result<Content>;

    /// Reply to an inbound event
    ///
    /// Reply tokens are single-use; a second reply with the same token is
    /// rejected by the platform.
    ///
    /// # Errors
    ///
    /// Returns error if the platform rejects the reply
    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<()>;
}
