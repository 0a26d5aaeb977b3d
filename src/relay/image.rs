//! Image message handling

use super::{EventOutcome, Relay};
use crate::Result;
use crate::channels::line::{EventMessage, MessageKind, WebhookEvent};
use crate::config::Scenario;
use crate::inference::{CompletionRequest, InlineMedia};
use crate::store::asset_path;

/// How far the image pipeline got
enum ImageReply {
    Described(String),
    UploadFailed,
}

impl Relay {
    /// Fetch, store, describe, then reply
    ///
    /// Upload failure replies with the upload notice and skips the
    /// completion call. Any other failure replies with the image apology.
    pub(super) async fn handle_image(
        &self,
        event: &WebhookEvent,
        message: &EventMessage,
        reply_token: &str,
    ) -> EventOutcome {
        tracing::info!(
            message_id = %message.id,
            user_id = event.user_id(),
            "image message received"
        );

        let (text, fallback) = match self.describe_image(event, message, reply_token).await {
            Ok(ImageReply::Described(text)) => (text, false),
            Ok(ImageReply::UploadFailed) => {
                (self.templates.get(Scenario::UploadFailed).to_string(), true)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    message_id = %message.id,
                    backend = self.completion.name(),
                    "image handling failed"
                );
                (self.templates.get(Scenario::ImageApology).to_string(), true)
            }
        };

        self.send_reply(reply_token, MessageKind::Image, text, fallback)
            .await
    }

    async fn describe_image(
        &self,
        event: &WebhookEvent,
        message: &EventMessage,
        reply_token: &str,
    ) -> Result<ImageReply> {
        let content = self.messenger.fetch_content(&message.id).await?;

        let path = asset_path(&self.storage_prefix, &message.id, &content.content_type);
        let stored = match self
            .store
            .upload(&path, &content.data, &content.content_type)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, %path, "image upload failed");
                return Ok(ImageReply::UploadFailed);
            }
        };

        let media = InlineMedia::from_bytes(&content.data, &content.content_type);
        let request =
            CompletionRequest::with_media(self.templates.get(Scenario::ImagePrompt), media);
        let description = self.completion.complete(&request).await?;

        if self.record_policy.records(MessageKind::Image) {
            let record = Self::record(event, message, reply_token, stored, &description);
            self.write_record(&record).await;
        }

        Ok(ImageReply::Described(description))
    }
}
