//! Error types for text generation

use thiserror::Error;

/// Errors that can occur while generating text
#[derive(Error, Debug)]
pub enum GenerateError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response body is not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// Server answered but produced no text
    #[error("Generation returned no text")]
    Empty,

    /// Generation is switched off
    #[error("Text generation is disabled")]
    Disabled,
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerateError>;
