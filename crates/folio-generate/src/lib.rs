//! folio-generate - section text for folio documents
//!
//! Sections are drafted by a [`TextGenerator`]. [`OllamaClient`] talks to a
//! local Ollama server; [`PlaceholderGenerator`] is used offline. The
//! [`ContentGenerator`] builds one prompt per section and falls back to a
//! placeholder text when the generator fails.

pub mod client;
pub mod content;
pub mod error;
pub mod ollama;

pub use client::{PlaceholderGenerator, TextGenerator};
pub use content::{
    build_prompt, placeholder_text, ContentGenerator, GeneratedSection, SectionKind,
    DEFAULT_SYSTEM_MESSAGE,
};
pub use error::{GenerateError, Result};
pub use ollama::{ConnectionStatus, OllamaClient, DEFAULT_OLLAMA_URL};
