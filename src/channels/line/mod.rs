//! LINE Messaging API adapter
//!
//! Receives events through the `/webhook` endpoint and uses the reply and
//! content APIs to answer them.

mod api;
pub mod signature;
pub mod types;

use std::time::Duration;

use secrecy::SecretString;

pub use signature::{SIGNATURE_HEADER, sign, verify_signature};
pub use types::{EventKind, EventMessage, EventSource, MessageKind, WebhookBody, WebhookEvent};

use super::OutgoingMessage;
use crate::Result;

/// Messaging API base URL
pub const API_BASE: &str = "https://api.line.me";

/// Content API base URL (binary downloads)
pub const DATA_API_BASE: &str = "https://api-data.line.me";

/// Maximum characters in a single text message
pub const MAX_TEXT_CHARS: usize = 5000;

/// Maximum messages in a single reply
pub const MAX_REPLY_MESSAGES: usize = 5;

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineClient {
    client: reqwest::Client,
    access_token: SecretString,
    api_base: String,
    data_api_base: String,
}

impl LineClient {
    /// Create a new client for a channel access token
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(access_token: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            access_token,
            api_base: API_BASE.to_string(),
            data_api_base: DATA_API_BASE.to_string(),
        })
    }

    /// Point the client at different API hosts
    #[must_use]
    pub fn with_base_urls(mut self, api_base: impl Into<String>, data_api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.data_api_base = data_api_base.into();
        self
    }
}

/// Split reply text into as many text messages as LINE accepts in one reply
///
/// Breaks on paragraph or line boundaries when possible. Text beyond the
/// last allowed message is cut and marked with an ellipsis.
#[must_use]
pub fn split_reply(text: &str) -> Vec<OutgoingMessage> {
    let mut chunks: Vec<String> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        if chunks.len() + 1 == MAX_REPLY_MESSAGES {
            chunks.push(truncate_chars(rest, MAX_TEXT_CHARS));
            break;
        }

        if rest.chars().count() <= MAX_TEXT_CHARS {
            chunks.push(rest.to_string());
            break;
        }

        let hard_end = rest
            .char_indices()
            .nth(MAX_TEXT_CHARS)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..hard_end];
        let split_at = window
            .rfind("\n\n")
            .or_else(|| window.rfind('\n'))
            .filter(|&i| i > 0)
            .unwrap_or(hard_end);

        chunks.push(rest[..split_at].trim_end().to_string());
        rest = rest[split_at..].trim_start();
    }

    chunks
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(OutgoingMessage::text)
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}
