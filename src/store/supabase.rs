//! Supabase storage and PostgREST client

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{MessageRecord, Store};
use crate::config::StoreConfig;
use crate::{Error, Result};

/// Supabase-backed [`Store`]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
    bucket: String,
    records_table: String,
}

impl SupabaseStore {
    /// Create a store client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.url.as_str().trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
            records_table: config.records_table.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("upload rejected: {status} - {body}")));
        }

        tracing::debug!(bucket = %self.bucket, path, bytes = data.len(), "object uploaded");
        Ok(path.to_string())
    }

    async fn insert_record(&self, record: &MessageRecord) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.records_table);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("insert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!("insert rejected: {status} - {body}")));
        }

        tracing::debug!(
            table = %self.records_table,
            message_id = %record.message_id,
            "message record inserted"
        );
        Ok(())
    }
}
