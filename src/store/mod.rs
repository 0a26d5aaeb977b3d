//! Persistence: blob storage for uploaded media and the message log
//!
//! The relay only ever appends. Objects are written with overwrite
//! semantics so reprocessing a message replaces the earlier upload.

mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use supabase::SupabaseStore;

use crate::Result;
use crate::channels::line::MessageKind;

/// Which events produce message records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Only text exchanges are logged
    #[default]
    TextOnly,
    /// Text and image exchanges are logged
    All,
}

impl RecordPolicy {
    /// Whether an exchange of this kind should be recorded
    #[must_use]
    pub const fn records(self, kind: MessageKind) -> bool {
        match self {
            Self::TextOnly => matches!(kind, MessageKind::Text),
            Self::All => matches!(kind, MessageKind::Text | MessageKind::Image),
        }
    }
}

/// A persisted row describing one processed exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub user_id: String,
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Original text, or the uploaded asset path for images
    pub content: String,
    pub reply_token: String,
    /// Generated reply text
    pub reply_content: String,
    pub created_at: DateTime<Utc>,
}

/// Storage backend for media and message records
#[async_trait]
pub trait Store: Send + Sync {
    /// Upload bytes to `path`, replacing any existing object
    ///
    /// Returns the stored object's path.
    ///
    /// # Errors
    ///
    /// Returns error if the upload is rejected
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Append a message record
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails
    async fn insert_record(&self, record: &MessageRecord) -> Result<()>;
}

/// Deterministic storage path for a message's media
///
/// The same message id always maps to the same path.
#[must_use]
pub fn asset_path(prefix: &str, message_id: &str, content_type: &str) -> String {
    let ext = extension_for(content_type);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{message_id}.{ext}")
    } else {
        format!("{prefix}/{message_id}.{ext}")
    }
}

/// File extension for an image content type
fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    match essence.as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        // LINE delivers photos as JPEG
        _ => "jpg",
    }
}
