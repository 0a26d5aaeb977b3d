//! Configuration management for the LINE relay
//!
//! Everything comes from the process environment. Secrets have no
//! defaults: startup fails listing every required variable that is unset.

pub mod templates;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

pub use templates::{Scenario, Templates};

use crate::store::RecordPolicy;
use crate::{Error, Result};

/// Default listening port
pub const DEFAULT_PORT: u16 = 3019;

/// Default completion model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Relay configuration
#[derive(Debug)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// LINE Messaging API credentials
    pub line: LineConfig,

    /// Completion API configuration
    pub llm: LlmConfig,

    /// Data store configuration
    pub store: StoreConfig,

    /// Which events produce message records
    pub record_policy: RecordPolicy,

    /// Optional TOML file overriding the built-in templates
    pub templates_path: Option<PathBuf>,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
}

/// LINE channel credentials
#[derive(Debug)]
pub struct LineConfig {
    pub channel_access_token: SecretString,
    pub channel_secret: SecretString,
}

/// Completion API configuration
#[derive(Debug)]
pub struct LlmConfig {
    pub api_key: SecretString,

    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: String,

    /// Upper bound on generated tokens per reply
    pub max_tokens: u32,
}

/// Supabase data store configuration
#[derive(Debug)]
pub struct StoreConfig {
    /// Project URL (e.g. `https://xyz.supabase.co`)
    pub url: url::Url,
    pub service_key: SecretString,

    /// Storage bucket receiving uploaded images
    pub bucket: String,

    /// Path prefix inside the bucket
    pub prefix: String,

    /// Table receiving message records
    pub records_table: String,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let access_token = require("LINE_CHANNEL_ACCESS_TOKEN");
        let channel_secret = require("LINE_CHANNEL_SECRET");
        let api_key = require("OPENAI_API_KEY");
        let store_url = require("SUPABASE_URL");
        let service_key = require("SUPABASE_SERVICE_KEY");

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let url = url::Url::parse(&store_url)
            .map_err(|e| Error::Config(format!("SUPABASE_URL is not a valid URL: {e}")))?;

        let port = parse_var(&get, "PORT", DEFAULT_PORT)?;
        let max_tokens = parse_var(&get, "RELAY_LLM_MAX_TOKENS", 1000)?;
        let timeout_secs: u64 = parse_var(&get, "RELAY_HTTP_TIMEOUT_SECS", 60)?;

        let record_policy = if parse_flag(&get, "RELAY_RECORD_IMAGES")? {
            RecordPolicy::All
        } else {
            RecordPolicy::TextOnly
        };

        Ok(Self {
            port,
            line: LineConfig {
                channel_access_token: SecretString::from(access_token),
                channel_secret: SecretString::from(channel_secret),
            },
            llm: LlmConfig {
                api_key: SecretString::from(api_key),
                model: get("RELAY_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                max_tokens,
            },
            store: StoreConfig {
                url,
                service_key: SecretString::from(service_key),
                bucket: get("RELAY_STORAGE_BUCKET").unwrap_or_else(|| "line-images".to_string()),
                prefix: get("RELAY_STORAGE_PREFIX").unwrap_or_else(|| "images".to_string()),
                records_table: get("RELAY_RECORDS_TABLE").unwrap_or_else(|| "messages".to_string()),
            },
            record_policy,
            templates_path: get("RELAY_TEMPLATES").map(PathBuf::from),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Resolve the templates, reading the overlay file when configured
    ///
    /// # Errors
    ///
    /// Returns error if the templates file is unreadable or invalid
    pub fn load_templates(&self) -> Result<Templates> {
        self.templates_path
            .as_deref()
            .map_or_else(|| Ok(Templates::default()), Templates::load)
    }
}

/// Parse an optional variable, falling back to a default when unset
fn parse_var<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| Error::Config(format!("{name} is invalid ({raw:?}): {e}")))
    })
}

/// Parse an optional boolean flag (`1`/`true`/`yes`, `0`/`false`/`no`)
fn parse_flag<G>(get: &G, name: &str) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => {
            Ok(true)
        }
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") => {
            Ok(false)
        }
        Some(v) => Err(Error::Config(format!("{name} must be a boolean, got {v:?}"))),
    }
}
