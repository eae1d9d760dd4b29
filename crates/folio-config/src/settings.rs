//! Runtime settings
//!
//! Read from `folio.toml`. Every section is optional; command-line flags are
//! applied on top by the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default settings file name, looked up in the working directory
pub const SETTINGS_FILE: &str = "folio.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Text generation service
    pub generator: GeneratorSettings,
    /// Input and output locations
    pub paths: PathSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load `path` if given, else `folio.toml` in `dir` if it exists, else defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(SETTINGS_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    tracing::debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.generator.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "generator.url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "generator.temperature".to_string(),
                message: format!("{} is outside 0.0..=2.0", self.generator.temperature),
            });
        }
        Ok(())
    }
}

/// Text generation service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base URL of the Ollama server
    pub url: String,
    /// Model name, with or without a tag
    pub model: String,
    /// Request timeout for one generation
    pub timeout_secs: u64,
    pub temperature: f32,
    /// When false every section gets placeholder text
    pub enabled: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "gemma3:latest".to_string(),
            timeout_secs: 120,
            temperature: 0.7,
            enabled: true,
        }
    }
}

/// File locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory the finished documents are written to
    pub output_dir: PathBuf,
    /// Project data file
    pub project_data: PathBuf,
    /// Guideline rules replacing the built-in ones
    pub guidelines: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            project_data: PathBuf::from("project_data.yaml"),
            guidelines: None,
        }
    }
}
