//! OpenAI chat completions client (text and vision)

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{Completion, CompletionRequest};
use crate::{Error, Result};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible completion client
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(api_key: SecretString, model: String, max_tokens: u32, timeout: Duration) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("OpenAI API key required".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
            model,
            max_tokens,
        })
    }

    /// Use a different API base URL (proxies, compatible providers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionRequest<'a> {
        let mut content = vec![ContentPart::Text {
            text: &request.prompt,
        }];
        if let Some(media) = &request.media {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: media.data_url(),
                },
            });
        }

        ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content,
            }],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("OpenAI API error: {status} - {body}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse OpenAI response: {e}")))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Inference("empty completion".to_string()));
        }

        tracing::debug!(
            model = %self.model,
            with_media = request.media.is_some(),
            chars = text.chars().count(),
            "completion generated"
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
