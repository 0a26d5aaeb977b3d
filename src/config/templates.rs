//! Prompt and reply templates
//!
//! Every fixed string the relay sends to a user or to the completion API is
//! keyed by a [`Scenario`]. The built-in defaults are Thai; a TOML file can
//! override any subset of them:
//!
//! ```toml
//! text_prompt = "Answer politely in Thai:\n\n{text}"
//! upload_failed = "Sorry, the image could not be saved."
//! ```
//!
//! `{text}` is replaced with the user's literal message text.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Placeholder substituted with the user's text
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// A situation that needs a fixed prompt or reply string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Instruction wrapped around a user's text message
    TextPrompt,
    /// Instruction sent alongside an image
    ImagePrompt,
    /// Reply when a text message could not be answered
    TextApology,
    /// Reply when an image could not be described
    ImageApology,
    /// Reply when an image could not be stored
    UploadFailed,
    /// Liveness greeting served on `GET /`
    Greeting,
}

impl Scenario {
    /// All scenarios, in a stable order
    pub const ALL: [Self; 6] = [
        Self::TextPrompt,
        Self::ImagePrompt,
        Self::TextApology,
        Self::ImageApology,
        Self::UploadFailed,
        Self::Greeting,
    ];

    /// Key used in the templates file
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TextPrompt => "text_prompt",
            Self::ImagePrompt => "image_prompt",
            Self::TextApology => "text_apology",
            Self::ImageApology => "image_apology",
            Self::UploadFailed => "upload_failed",
            Self::Greeting => "greeting",
        }
    }

    /// Built-in template
    #[must_use]
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::TextPrompt => {
                "คุณเป็นผู้ช่วยที่เป็นมิตร ตอบข้อความต่อไปนี้เป็นภาษาไทยอย่างสุภาพและกระชับ\n\nข้อความ: {text}"
            }
            Self::ImagePrompt => "อธิบายสิ่งที่เห็นในรูปภาพนี้เป็นภาษาไทยอย่างกระชับ",
            Self::TextApology => {
                "ขออภัยค่ะ ระบบไม่สามารถตอบข้อความได้ในขณะนี้ กรุณาลองใหม่อีกครั้ง"
            }
            Self::ImageApology => {
                "ขออภัยค่ะ ระบบไม่สามารถวิเคราะห์รูปภาพได้ในขณะนี้ กรุณาลองใหม่อีกครั้ง"
            }
            Self::UploadFailed => "ขออภัยค่ะ ไม่สามารถบันทึกรูปภาพได้ กรุณาส่งรูปภาพอีกครั้ง",
            Self::Greeting => "hello world, LnwDangza",
        }
    }
}

/// Templates file schema
///
/// All fields are optional; the file is a partial overlay on the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplatesFile {
    text_prompt: Option<String>,
    image_prompt: Option<String>,
    text_apology: Option<String>,
    image_apology: Option<String>,
    upload_failed: Option<String>,
    greeting: Option<String>,
}

impl TemplatesFile {
    fn into_overrides(self) -> Vec<(Scenario, String)> {
        [
            (Scenario::TextPrompt, self.text_prompt),
            (Scenario::ImagePrompt, self.image_prompt),
            (Scenario::TextApology, self.text_apology),
            (Scenario::ImageApology, self.image_apology),
            (Scenario::UploadFailed, self.upload_failed),
            (Scenario::Greeting, self.greeting),
        ]
        .into_iter()
        .filter_map(|(scenario, value)| value.map(|v| (scenario, v)))
        .collect()
    }
}

/// Mapping from scenario to template string
#[derive(Debug, Clone)]
pub struct Templates {
    entries: HashMap<Scenario, String>,
}

impl Default for Templates {
    fn default() -> Self {
        let entries = Scenario::ALL
            .iter()
            .map(|s| (*s, s.default_template().to_string()))
            .collect();
        Self { entries }
    }
}

impl Templates {
    /// Load templates from a TOML file, falling back to defaults per key
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Template(format!("failed to read {}: {e}", path.display()))
        })?;
        let templates = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded templates file");
        Ok(templates)
    }

    /// Parse a TOML overlay onto the defaults
    ///
    /// # Errors
    ///
    /// Returns error on malformed TOML, unknown keys, empty templates, or a
    /// text prompt without the `{text}` placeholder
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: TemplatesFile = toml::from_str(raw)?;

        let mut templates = Self::default();
        for (scenario, value) in file.into_overrides() {
            templates = templates.with(scenario, value);
        }
        templates.validate()?;
        Ok(templates)
    }

    /// Replace a single template
    #[must_use]
    pub fn with(mut self, scenario: Scenario, template: impl Into<String>) -> Self {
        self.entries.insert(scenario, template.into());
        self
    }

    /// Raw template for a scenario
    #[must_use]
    pub fn get(&self, scenario: Scenario) -> &str {
        self.entries
            .get(&scenario)
            .map_or_else(|| scenario.default_template(), String::as_str)
    }

    /// Template with `{text}` replaced by the given text
    #[must_use]
    pub fn render(&self, scenario: Scenario, text: &str) -> String {
        self.get(scenario).replace(TEXT_PLACEHOLDER, text)
    }

    fn validate(&self) -> Result<()> {
        for scenario in Scenario::ALL {
            if self.get(scenario).trim().is_empty() {
                return Err(Error::Template(format!(
                    "template `{}` must not be empty",
                    scenario.key()
                )));
            }
        }

        // Without the placeholder the user's message would never reach the model
        if !self.get(Scenario::TextPrompt).contains(TEXT_PLACEHOLDER) {
            return Err(Error::Template(format!(
                "template `text_prompt` must contain {TEXT_PLACEHOLDER}"
            )));
        }

        Ok(())
    }
}
