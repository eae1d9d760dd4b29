//! Text generator interface

use crate::error::{GenerateError, Result};

/// Something that turns a prompt into text
pub trait TextGenerator {
    /// Generate text for `prompt`, guided by an optional system message
    fn generate(&self, prompt: &str, system_message: Option<&str>) -> Result<String>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Generator used offline; every request fails with [`GenerateError::Disabled`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGenerator;

impl TextGenerator for PlaceholderGenerator {
    fn generate(&self, _prompt: &str, _system_message: Option<&str>) -> Result<String> {
        Err(GenerateError::Disabled)
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, prompt: &str, system_message: Option<&str>) -> Result<String> {
        (**self).generate(prompt, system_message)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
