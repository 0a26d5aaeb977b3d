//! Generative AI completion
//!
//! A [`Completion`] turns a prompt, optionally paired with inline media,
//! into generated text.

mod openai;

use async_trait::async_trait;
use base64::Engine;

pub use openai::OpenAiClient;

use crate::Result;

/// Binary media embedded directly in a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMedia {
    /// MIME type of the payload (e.g. "image/jpeg")
    pub media_type: String,

    /// Base64-encoded payload
    pub data_base64: String,
}

impl InlineMedia {
    /// Encode raw bytes for transport
    #[must_use]
    pub fn from_bytes(data: &[u8], media_type: &str) -> Self {
        Self {
            media_type: normalize_media_type(media_type).to_string(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(data),
        }
    }

    /// `data:` URL form of the payload
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub media: Option<InlineMedia>,
}

impl CompletionRequest {
    /// Text-only request
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            media: None,
        }
    }

    /// Request pairing a prompt with inline media
    #[must_use]
    pub fn with_media(prompt: impl Into<String>, media: InlineMedia) -> Self {
        Self {
            prompt: prompt.into(),
            media: Some(media),
        }
    }
}

/// Completion backend
#[async_trait]
pub trait Completion: Send + Sync {
    /// Generate text for a request
    ///
    /// The returned text is trimmed and never empty; callers use it as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or yields no text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Normalize an image MIME type to one vision APIs accept
fn normalize_media_type(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence.to_lowercase().as_str() {
        "image/png" => "image/png",
        "image/gif" => "image/gif",
        "image/webp" => "image/webp",
        // jpeg, jpg, and any unknown type default to jpeg
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_media_encoding() {
        let media = InlineMedia::from_bytes(b"cat", "image/jpeg");
        assert_eq!(media.data_base64, "Y2F0");
        assert_eq!(media.data_url(), "data:image/jpeg;base64,Y2F0");
    }

    #[test]
    fn test_normalize_media_type() {
        assert_eq!(normalize_media_type("image/PNG"), "image/png");
        assert_eq!(normalize_media_type("image/webp; q=1"), "image/webp");
        assert_eq!(normalize_media_type("image/jpg"), "image/jpeg");
        assert_eq!(normalize_media_type("application/octet-stream"), "image/jpeg");
    }
}
