//! Shared test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use line_relay::api::{ApiState, router};
use line_relay::channels::line::WebhookEvent;
use line_relay::{
    Completion, CompletionRequest, Content, Error, MessageRecord, Messenger, OutgoingMessage,
    Relay, Result, Store, Templates,
};
use secrecy::SecretString;

/// Channel secret used to sign test deliveries
pub const CHANNEL_SECRET: &str = "test-channel-secret";

/// Ordered log of collaborator calls, shared across mocks
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// Messenger recording every reply
#[derive(Default)]
pub struct MockMessenger {
    pub replies: Mutex<Vec<(String, Vec<OutgoingMessage>)>>,
    pub fetched: Mutex<Vec<String>>,
    pub fail_fetch: bool,
    /// Reply tokens the platform rejects
    pub reject_tokens: Vec<String>,
    pub log: CallLog,
}

impl MockMessenger {
    pub fn failing_fetch() -> Self {
        Self {
            fail_fetch: true,
            ..Self::default()
        }
    }

    pub fn rejecting(token: &str) -> Self {
        Self {
            reject_tokens: vec![token.to_string()],
            ..Self::default()
        }
    }

    /// Replies as (token, joined text)
    pub fn sent(&self) -> Vec<(String, String)> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .map(|(token, messages)| {
                let text = messages
                    .iter()
                    .map(OutgoingMessage::as_text)
                    .collect::<Vec<_>>()
                    .join("\n");
                (token.clone(), text)
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn fetch_content(&self, message_id: &str) -> Result<Content> {
        self.fetched.lock().unwrap().push(message_id.to_string());
        if self.fail_fetch {
            return Err(Error::Messaging("content not found".to_string()));
        }
        Ok(Content {
            data: b"\xff\xd8\xff\xe0fake-jpeg".to_vec(),
            content_type: "image/jpeg".to_string(),
        })
    }

    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<()> {
        self.log.lock().unwrap().push("reply");
        if self.reject_tokens.iter().any(|t| t == reply_token) {
            return Err(Error::Messaging("Invalid reply token".to_string()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages.to_vec()));
        Ok(())
    }
}

/// Completion returning a fixed answer, or failing
pub struct MockCompletion {
    pub answer: Option<String>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.answer
            .clone()
            .ok_or_else(|| Error::Inference("rate limited".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Store keeping uploads and records in memory
#[derive(Default)]
pub struct MockStore {
    pub uploads: Mutex<Vec<String>>,
    pub records: Mutex<Vec<MessageRecord>>,
    pub fail_upload: bool,
    pub fail_insert: bool,
    pub log: CallLog,
}

impl MockStore {
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<MessageRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn upload(&self, path: &str, _data: &[u8], _content_type: &str) -> Result<String> {
        if self.fail_upload {
            return Err(Error::Storage("bucket unavailable".to_string()));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(path.to_string())
    }

    async fn insert_record(&self, record: &MessageRecord) -> Result<()> {
        self.log.lock().unwrap().push("insert_record");
        if self.fail_insert {
            return Err(Error::Persistence("insert rejected".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Collaborators of one test relay, kept for assertions
pub struct Harness {
    pub messenger: Arc<MockMessenger>,
    pub completion: Arc<MockCompletion>,
    pub store: Arc<MockStore>,
}

impl Harness {
    /// The messenger and store share one call log
    pub fn new(messenger: MockMessenger, completion: MockCompletion, mut store: MockStore) -> Self {
        store.log = messenger.log.clone();
        Self {
            messenger: Arc::new(messenger),
            completion: Arc::new(completion),
            store: Arc::new(store),
        }
    }

    pub fn answering(answer: &str) -> Self {
        Self::new(
            MockMessenger::default(),
            MockCompletion::answering(answer),
            MockStore::default(),
        )
    }

    /// Reply and record calls in the order they happened
    pub fn calls(&self) -> Vec<&'static str> {
        self.messenger.log.lock().unwrap().clone()
    }

    pub fn relay(&self) -> Relay {
        Relay::new(
            self.messenger.clone(),
            self.completion.clone(),
            self.store.clone(),
            Templates::default(),
        )
    }

    /// Router over this harness, verifying against [`CHANNEL_SECRET`]
    pub fn router(&self) -> axum::Router {
        self.router_with(self.relay())
    }

    pub fn router_with(&self, relay: Relay) -> axum::Router {
        router(Arc::new(ApiState {
            relay,
            channel_secret: SecretString::from(CHANNEL_SECRET.to_string()),
        }))
    }
}

/// Text message event
pub fn text_event(id: &str, reply_token: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_625_665_242_211_i64,
        "webhookEventId": format!("evt-{id}"),
        "source": {"type": "user", "userId": "U4af4980629"},
        "replyToken": reply_token,
        "message": {"type": "text", "id": id, "text": text}
    })
}

/// Image message event
pub fn image_event(id: &str, reply_token: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_625_665_242_211_i64,
        "webhookEventId": format!("evt-{id}"),
        "source": {"type": "user", "userId": "U4af4980629"},
        "replyToken": reply_token,
        "message": {"type": "image", "id": id, "contentProvider": {"type": "line"}}
    })
}

/// Sticker message event
pub fn sticker_event(id: &str, reply_token: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "timestamp": 1_625_665_242_211_i64,
        "source": {"type": "user", "userId": "U4af4980629"},
        "replyToken": reply_token,
        "message": {"type": "sticker", "id": id, "packageId": "446", "stickerId": "1988"}
    })
}

/// Full webhook body around some events
pub fn webhook_body(events: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({"destination": "Ubot", "events": events})
}

/// Parse events for direct dispatch
pub fn parse_events(events: Vec<serde_json::Value>) -> Vec<WebhookEvent> {
    serde_json::from_value(serde_json::Value::Array(events)).unwrap()
}
