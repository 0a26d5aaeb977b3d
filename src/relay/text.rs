//! Text message handling

use super::{EventOutcome, Relay};
use crate::Result;
use crate::channels::line::{EventMessage, MessageKind, WebhookEvent};
use crate::config::Scenario;
use crate::inference::CompletionRequest;

impl Relay {
    /// Prompt, complete, record, then reply
    pub(super) async fn handle_text(
        &self,
        event: &WebhookEvent,
        message: &EventMessage,
        text: &str,
        reply_token: &str,
    ) -> EventOutcome {
        tracing::info!(
            message_id = %message.id,
            user_id = event.user_id(),
            chars = text.chars().count(),
            "text message received"
        );

        let (reply, fallback) = match self.answer_text(event, message, text, reply_token).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    message_id = %message.id,
                    backend = self.completion.name(),
                    "text handling failed"
                );
                (self.templates.get(Scenario::TextApology).to_string(), true)
            }
        };

        self.send_reply(reply_token, MessageKind::Text, reply, fallback)
            .await
    }

    async fn answer_text(
        &self,
        event: &WebhookEvent,
        message: &EventMessage,
        text: &str,
        reply_token: &str,
    ) -> Result<String> {
        // Empty input is forwarded as-is
        let prompt = self.templates.render(Scenario::TextPrompt, text);
        let reply = self
            .completion
            .complete(&CompletionRequest::text(prompt))
            .await?;

        // Recorded before the reply goes out
        if self.record_policy.records(MessageKind::Text) {
            let record = Self::record(event, message, reply_token, text.to_string(), &reply);
            self.write_record(&record).await;
        }

        Ok(reply)
    }
}
