//! Error types for configuration and input loading

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading settings, guidelines or project data
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed settings or guideline file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed project data file
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Project data is not a key-value map
    #[error("Project data must be a mapping of keys to values")]
    NotAMapping,

    /// Required project keys are absent or empty
    #[error("Missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A key expected to hold a list holds something else
    #[error("Key '{key}' should be a list (e.g. using '- item'), found {found}")]
    NotAList { key: String, found: String },

    /// A value has the right shape but an unusable content
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
