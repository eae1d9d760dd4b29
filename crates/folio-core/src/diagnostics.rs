//! Build diagnostics for folio
//!
//! Every recoverable condition met while assembling a document is recorded as
//! a [`Diagnostic`]. None of them stops the build: the document is always
//! produced, and the diagnostics tell the caller what was degraded.

use serde::{Deserialize, Serialize};

/// Diagnostic codes raised by the engine and its collaborators
pub mod codes {
    /// Heading registered out of structural order
    pub const STRUCTURE_ORDER: &str = "FOL101";
    /// List resolved without a reserved anchor
    pub const MISSING_ANCHOR: &str = "FOL201";
    /// Anchor reserved twice for the same list
    pub const DUPLICATE_ANCHOR: &str = "FOL202";
    /// No body region was started explicitly
    pub const PIVOT_FALLBACK: &str = "FOL301";
    /// Region kind contradicts the region ordering
    pub const REGION_COERCED: &str = "FOL302";
    /// Unknown style key, default style used
    pub const STYLE_FALLBACK: &str = "FOL401";
    /// Text generation failed or returned nothing
    pub const GENERATION_FAILED: &str = "FOL501";
    /// Referenced image file could not be read
    pub const IMAGE_MISSING: &str = "FOL502";
    /// Figure or table hint names a chapter the document does not have
    pub const HINT_UNPLACED: &str = "FOL503";
}

/// A diagnostic message raised during a document build
///
/// # Example
///
/// ```
/// use folio_core::diagnostics::{codes, Diagnostic, Severity};
///
/// let diag = Diagnostic::warning("Level 2 heading 'Scope' has no open chapter")
///     .with_code(codes::STRUCTURE_ORDER)
///     .with_help("Add a level 1 heading before it");
///
/// assert_eq!(diag.severity, Severity::Warning);
/// assert!(diag.to_string().starts_with("warning[FOL101]"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Diagnostic code (see [`codes`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Related notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Something was degraded but the build went on
    Warning,

    /// Something is wrong in the output
    Error,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            help: None,
            notes: Vec::new(),
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Check whether the diagnostic carries the given code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// Emit the diagnostic through `tracing` at a level matching its severity
    pub fn log(&self) {
        let code = self.code.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Info => tracing::info!(code, "{}", self.message),
            Severity::Warning => tracing::warn!(code, "{}", self.message),
            Severity::Error => tracing::error!(code, "{}", self.message),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}

/// A collection of diagnostics, in the order they were raised
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }

    /// Log and record several diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Count diagnostics carrying a given code
    pub fn count_code(&self, code: &str) -> usize {
        self.diagnostics.iter().filter(|d| d.has_code(code)).count()
    }

    /// Get all diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the count
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::warning("Image not found")
            .with_code(codes::IMAGE_MISSING)
            .with_help("Check the figure path")
            .with_note("data/arch.png");

        assert!(diag.is_warning());
        assert!(diag.has_code("FOL502"));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("a").with_code(codes::STRUCTURE_ORDER));
        diags.push(Diagnostic::warning("b").with_code(codes::STRUCTURE_ORDER));
        diags.push(Diagnostic::info("c"));

        assert!(!diags.has_errors());
        assert_eq!(diags.warning_count(), 2);
        assert_eq!(diags.count_code(codes::STRUCTURE_ORDER), 2);
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("No body region was started")
            .with_code(codes::PIVOT_FALLBACK)
            .with_help("Start a body region before the first chapter");

        let display = format!("{}", diag);
        assert!(display.contains("warning[FOL301]"));
        assert!(display.contains("help: Start a body region"));
    }

    #[test]
    fn test_diagnostic_serialize() {
        let diag = Diagnostic::warning("Unknown style").with_code(codes::STYLE_FALLBACK);

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"FOL401\""));

        let restored: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, diag);
    }
}
