//! Speech request types

use serde::{Deserialize, Serialize};

use crate::error::{EchovoxError, Result};

/// Default speech language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default regional accent (provider top-level domain)
pub const DEFAULT_ACCENT: &str = "co.uk";

/// Voice settings applied to every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub language: String,
    pub accent: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

/// A single piece of text to be spoken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
    pub accent: String,
}

impl SpeechRequest {
    /// Create a request with the default voice
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_settings(text, &SpeechSettings::default())
    }

    /// Create a request using configured voice settings
    pub fn with_settings(text: impl Into<String>, settings: &SpeechSettings) -> Self {
        Self {
            text: text.into(),
            language: settings.language.clone(),
            accent: settings.accent.clone(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_accent(mut self, accent: impl Into<String>) -> Self {
        self.accent = accent.into();
        self
    }

    /// Reject requests a provider could not speak
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(EchovoxError::invalid_input("speech text is blank"));
        }
        if self.language.trim().is_empty() {
            return Err(EchovoxError::invalid_input("speech language is empty"));
        }
        Ok(())
    }
}
