//! Event dispatch and reply orchestration
//!
//! A webhook delivery carries a batch of events. [`Relay::dispatch`] routes
//! every event to its handler, drives all handlers concurrently on the
//! calling task, and returns one outcome per event in delivery order.
//!
//! Each handler settles on its own: failures become a fallback reply or a
//! `reply_failed` outcome for that event, never an error for the batch.
//!
//! ```text
//!   events ──▶ route ──┬─▶ image: fetch ─▶ upload ─▶ describe ─▶ reply
//!                      ├─▶ text:  prompt ─▶ complete ─▶ record ─▶ reply
//!                      └─▶ ignore (null)
//! ```

mod image;
mod text;

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;

use crate::channels::line::{EventKind, EventMessage, MessageKind, WebhookEvent, split_reply};
use crate::channels::Messenger;
use crate::config::Templates;
use crate::inference::Completion;
use crate::store::{MessageRecord, RecordPolicy, Store};

/// Default path prefix for uploaded images
pub const DEFAULT_STORAGE_PREFIX: &str = "images";

/// Result of handling one event that reached a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    /// A reply was delivered
    Replied {
        kind: MessageKind,
        text: String,
        /// Whether the reply is a fixed failure notice instead of generated text
        fallback: bool,
    },
    /// The platform rejected the reply
    ReplyFailed { kind: MessageKind, error: String },
}

impl EventOutcome {
    /// Text of the delivered reply, if any
    #[must_use]
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Self::Replied { text, .. } => Some(text),
            Self::ReplyFailed { .. } => None,
        }
    }
}

/// Handler an event is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Image(&'a EventMessage),
    Text(&'a EventMessage, &'a str),
    Ignore,
}

/// Route an event; the first matching rule wins
///
/// 1. image messages go to the image handler
/// 2. anything that is not a text message event is ignored
/// 3. text messages go to the text handler
#[must_use]
pub fn route(event: &WebhookEvent) -> Route<'_> {
    match &event.message {
        Some(message) if message.kind == MessageKind::Image => Route::Image(message),
        Some(message) if event.kind == EventKind::Message && message.kind == MessageKind::Text => {
            Route::Text(message, message.text.as_deref().unwrap_or_default())
        }
        _ => Route::Ignore,
    }
}

/// Relay between the chat platform, the completion API and the store
pub struct Relay {
    messenger: Arc<dyn Messenger>,
    completion: Arc<dyn Completion>,
    store: Arc<dyn Store>,
    templates: Templates,
    storage_prefix: String,
    record_policy: RecordPolicy,
}

impl Relay {
    /// Create a relay over explicit collaborators
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        completion: Arc<dyn Completion>,
        store: Arc<dyn Store>,
        templates: Templates,
    ) -> Self {
        Self {
            messenger,
            completion,
            store,
            templates,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            record_policy: RecordPolicy::default(),
        }
    }

    /// Set the path prefix for uploaded images
    #[must_use]
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// Set which exchanges are recorded
    #[must_use]
    pub const fn with_record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    /// Templates used for prompts and fixed replies
    #[must_use]
    pub const fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Handle every event of one delivery
    ///
    /// Returns one entry per event, in input order; `None` for ignored events.
    pub async fn dispatch(&self, events: &[WebhookEvent]) -> Vec<Option<EventOutcome>> {
        let outcomes = join_all(events.iter().map(|event| self.handle_event(event))).await;

        let replied = outcomes
            .iter()
            .filter(|o| matches!(o, Some(EventOutcome::Replied { .. })))
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, Some(EventOutcome::ReplyFailed { .. })))
            .count();
        tracing::info!(
            events = events.len(),
            replied,
            failed,
            ignored = events.len() - replied - failed,
            "webhook batch settled"
        );

        outcomes
    }

    /// Route and handle a single event
    pub async fn handle_event(&self, event: &WebhookEvent) -> Option<EventOutcome> {
        let route = route(event);
        if matches!(route, Route::Ignore) {
            tracing::debug!(
                event_type = ?event.kind,
                message_type = ?event.message_kind(),
                "ignoring event"
            );
            return None;
        }

        let Some(reply_token) = event.reply_token.as_deref() else {
            tracing::warn!(
                event_id = event.webhook_event_id.as_deref().unwrap_or_default(),
                "message event without reply token, skipping"
            );
            return None;
        };

        let outcome = match route {
            Route::Image(message) => self.handle_image(event, message, reply_token).await,
            Route::Text(message, text) => {
                self.handle_text(event, message, text, reply_token).await
            }
            Route::Ignore => return None,
        };
        Some(outcome)
    }

    /// Send the single reply for an event
    async fn send_reply(
        &self,
        reply_token: &str,
        kind: MessageKind,
        text: String,
        fallback: bool,
    ) -> EventOutcome {
        let messages = split_reply(&text);

        match self.messenger.reply(reply_token, &messages).await {
            Ok(()) => EventOutcome::Replied {
                kind,
                text,
                fallback,
            },
            Err(e) => {
                tracing::error!(error = %e, ?kind, "failed to send reply");
                EventOutcome::ReplyFailed {
                    kind,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Append a record; failures are logged and swallowed
    async fn write_record(&self, record: &MessageRecord) {
        if let Err(e) = self.store.insert_record(record).await {
            tracing::warn!(
                error = %e,
                message_id = %record.message_id,
                "failed to store message record"
            );
        }
    }

    /// Build the record for an exchange
    fn record(
        event: &WebhookEvent,
        message: &EventMessage,
        reply_token: &str,
        content: String,
        reply_content: &str,
    ) -> MessageRecord {
        MessageRecord {
            user_id: event.user_id().to_string(),
            message_id: message.id.clone(),
            kind: message.kind,
            content,
            reply_token: reply_token.to_string(),
            reply_content: reply_content.to_string(),
            created_at: Utc::now(),
        }
    }
}
