//! Raw LINE Messaging API calls

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::LineClient;
use super::types::ReplyRequest;
use crate::channels::{Content, Messenger, OutgoingMessage};
use crate::{Error, Result};

/// Content type assumed when the content API omits one
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

#[async_trait]
impl Messenger for LineClient {
    async fn fetch_content(&self, message_id: &str) -> Result<Content> {
        let url = format!("{}/v2/bot/message/{message_id}/content", self.data_api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::Messaging(format!("LINE content API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Messaging(format!(
                "LINE content API error: {status} - {body}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Messaging(format!("LINE content download failed: {e}")))?
            .to_vec();

        tracing::debug!(message_id, bytes = data.len(), %content_type, "LINE content fetched");
        Ok(Content { data, content_type })
    }

    async fn reply(&self, reply_token: &str, messages: &[OutgoingMessage]) -> Result<()> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);

        let request = ReplyRequest {
            reply_token,
            messages,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Messaging(format!("LINE reply API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Messaging(format!(
                "LINE reply API error: {status} - {body}"
            )));
        }

        tracing::debug!(messages = messages.len(), "LINE reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> LineClient {
        LineClient::new(
            SecretString::from("channel-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_urls(server.uri(), server.uri())
    }

    #[tokio::test]
    async fn test_reply_sends_token_and_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", "Bearer channel-token"))
            .and(body_json(serde_json::json!({
                "replyToken": "reply-token",
                "messages": [{"type": "text", "text": "Hi there"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .reply("reply-token", &[OutgoingMessage::text("Hi there")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reply_with_spent_token_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"message":"Invalid reply token"}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .reply("used-token", &[OutgoingMessage::text("again")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Messaging(ref m) if m.contains("Invalid reply token")));
    }

    #[tokio::test]
    async fn test_fetch_content() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/bot/message/325708/content"))
            .and(header("authorization", "Bearer channel-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
            )
            .mount(&server)
            .await;

        let content = client_for(&server).fetch_content("325708").await.unwrap();
        assert_eq!(content.content_type, "image/png");
        assert_eq!(content.data, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_fetch_content_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_content("missing").await.unwrap_err();
        assert!(matches!(err, Error::Messaging(_)));
    }
}
