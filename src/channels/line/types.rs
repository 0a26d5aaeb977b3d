//! LINE webhook types

use serde::{Deserialize, Serialize};

/// Webhook request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookBody {
    /// Bot user ID receiving the events
    #[serde(default)]
    pub destination: Option<String>,

    /// Events in delivery order (empty when LINE verifies the endpoint)
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// Webhook event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    /// follow, unfollow, postback, join, ...
    #[serde(other)]
    Other,
}

/// Message content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    /// video, audio, file, location, sticker, ...
    #[serde(other)]
    Other,
}

/// A single webhook event (simplified)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

impl WebhookEvent {
    /// Type of the attached message, if any
    #[must_use]
    pub fn message_kind(&self) -> Option<MessageKind> {
        self.message.as_ref().map(|m| m.kind)
    }

    /// Sending user's ID, empty when the source carries none
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.source
            .as_ref()
            .and_then(|s| s.user_id.as_deref())
            .unwrap_or_default()
    }
}

/// Message object of a message event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Present for text messages
    #[serde(default)]
    pub text: Option<String>,
}

/// Event source (user, group or room); only the sender is kept
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Reply API request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [crate::channels::OutgoingMessage],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_event() {
        let body: WebhookBody = serde_json::from_str(
            r#"{
                "destination": "Uxxxxxxxx",
                "events": [{
                    "type": "message",
                    "message": {"type": "text", "id": "14353798921116", "text": "hello"},
                    "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                    "timestamp": 1625665242211,
                    "source": {"type": "user", "userId": "U80696558e1aa831"},
                    "replyToken": "757913772c4646b784d4b7ce46d12671",
                    "mode": "active",
                    "deliveryContext": {"isRedelivery": false}
                }]
            }"#,
        )
        .unwrap();

        let event = &body.events[0];
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.message_kind(), Some(MessageKind::Text));
        assert_eq!(event.user_id(), "U80696558e1aa831");
        assert_eq!(event.reply_token.as_deref(), Some("757913772c4646b784d4b7ce46d12671"));
        assert_eq!(event.message.as_ref().and_then(|m| m.text.as_deref()), Some("hello"));
    }

    #[test]
    fn test_unknown_types_parse_as_other() {
        let body: WebhookBody = serde_json::from_str(
            r#"{"events": [
                {"type": "follow", "replyToken": "rt", "source": {"type": "user", "userId": "U1"}, "timestamp": 1},
                {"type": "message", "message": {"type": "sticker", "id": "2", "packageId": "1"}, "timestamp": 2}
            ]}"#,
        )
        .unwrap();

        assert_eq!(body.events[0].kind, EventKind::Other);
        assert_eq!(body.events[0].message_kind(), None);
        assert_eq!(body.events[1].message_kind(), Some(MessageKind::Other));
        assert_eq!(body.events[1].user_id(), "");
    }

    #[test]
    fn test_group_source_keeps_sender_only() {
        let body: WebhookBody = serde_json::from_str(
            r#"{"events": [{
                "type": "message",
                "message": {"type": "text", "id": "3", "text": "hi"},
                "timestamp": 1625665242211,
                "source": {"type": "group", "groupId": "Ca56f94637c", "userId": "U206d25c2ea"},
                "replyToken": "rt"
            }]}"#,
        )
        .unwrap();

        assert_eq!(body.events[0].user_id(), "U206d25c2ea");
    }

    #[test]
    fn test_verification_body_has_no_events() {
        let body: WebhookBody =
            serde_json::from_str(r#"{"destination": "U1", "events": []}"#).unwrap();
        assert!(body.events.is_empty());
    }
}
