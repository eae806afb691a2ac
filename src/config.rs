//! Configuration file handling
//!
//! A single JSON document holding the echo controls and voice settings.
//! Missing sections fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dsp::EchoParameters;
use crate::error::{EchovoxError, Result};
use crate::speech::SpeechSettings;

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchovoxConfig {
    pub echo: EchoParameters,
    pub speech: SpeechSettings,
}

impl EchovoxConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EchovoxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: EchovoxConfig = serde_json::from_str(&content)?;
        config.echo.validate()?;

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
