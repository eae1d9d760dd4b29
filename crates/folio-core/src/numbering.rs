//! Numbering engine
//!
//! Assigns hierarchical numbers to headings and chapter-scoped numbers to
//! figures and tables while content streams in. Pure state machine: it never
//! fails, it degrades. A heading that arrives out of structural order comes
//! back as [`Registration::Warning`] with an un-numbered record.

use thiserror::Error;

use crate::diagnostics::{codes, Diagnostic};
use crate::model::{CaptionKind, DocType, HeadingRecord, NumberPath, Position};
use crate::regions::RegionKind;

/// Style keys for headings, as named in the guideline rules
pub mod style_keys {
    pub const CHAPTER: &str = "heading_chapter";
    pub const SECTION: &str = "heading_section";
    pub const SUBSECTION: &str = "heading_subsection";
    pub const SYNOPSIS_SECTION: &str = "heading1";
    pub const NORMAL_TEXT: &str = "normal_text";
}

/// Why a registration could not follow the structural rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureViolation {
    #[error("level {level} heading '{text}' has no open chapter")]
    NoOpenChapter { level: u8, text: String },

    #[error("level 3 heading '{text}' has no open section")]
    NoOpenSection { text: String },

    #[error("level {level} heading '{text}' is not allowed in a {doc_type}")]
    LevelNotAllowed {
        level: u8,
        text: String,
        doc_type: DocType,
    },

    #[error("region {ordinal} was requested as {requested:?} but must be {assigned:?}")]
    RegionKindCoerced {
        ordinal: u32,
        requested: RegionKind,
        assigned: RegionKind,
    },
}

impl StructureViolation {
    /// Diagnostic code for this violation
    pub fn code(&self) -> &'static str {
        match self {
            StructureViolation::RegionKindCoerced { .. } => codes::REGION_COERCED,
            _ => codes::STRUCTURE_ORDER,
        }
    }

    /// Convert into a warning diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let help = match self {
            StructureViolation::NoOpenChapter { .. } => {
                "Add a level 1 heading first; the heading was left un-numbered"
            }
            StructureViolation::NoOpenSection { .. } => {
                "Add a level 2 heading first; the heading was left un-numbered"
            }
            StructureViolation::LevelNotAllowed { .. } => {
                "Synopsis documents only number level 1 headings"
            }
            StructureViolation::RegionKindCoerced { .. } => {
                "Regions run title page, front matter, then body"
            }
        };
        Diagnostic::warning(self.to_string())
            .with_code(self.code())
            .with_help(help)
    }
}

/// Result of registering something that may be degraded
#[derive(Debug, Clone, PartialEq)]
pub enum Registration<T> {
    /// Registered as requested
    Ok(T),
    /// Registered in a degraded form
    Warning(T, StructureViolation),
}

impl<T> Registration<T> {
    /// The registered value, degraded or not
    pub fn record(&self) -> &T {
        match self {
            Registration::Ok(record) | Registration::Warning(record, _) => record,
        }
    }

    /// Take the registered value, discarding the warning
    pub fn into_record(self) -> T {
        match self {
            Registration::Ok(record) | Registration::Warning(record, _) => record,
        }
    }

    /// The violation, if the registration was degraded
    pub fn violation(&self) -> Option<&StructureViolation> {
        match self {
            Registration::Ok(_) => None,
            Registration::Warning(_, violation) => Some(violation),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Registration::Warning(..))
    }
}

/// Session-scoped heading and caption counters
#[derive(Debug, Clone, Default)]
pub struct NumberingEngine {
    chapter: u32,
    section: u32,
    subsection: u32,
    figure_in_chapter: u32,
    table_in_chapter: u32,
    current_chapter: u32,
}

impl NumberingEngine {
    /// Create an engine with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// The active chapter number, 0 when no chapter is open
    pub fn current_chapter(&self) -> u32 {
        self.current_chapter
    }

    /// Register a heading and produce its record
    ///
    /// # Example
    ///
    /// Positions come from the session, so the usual entry point is
    /// [`DocumentSession::add_heading`](crate::session::DocumentSession::add_heading):
    ///
    /// ```
    /// use folio_core::{DocType, DocumentSession};
    ///
    /// let mut session = DocumentSession::new(DocType::Report);
    /// let chapter = session.add_heading(1, "Introduction");
    /// assert_eq!(chapter.record().display_text, "CHAPTER 1: INTRODUCTION");
    /// ```
    pub fn register_heading(
        &mut self,
        level: u8,
        text: &str,
        doc_type: DocType,
        position: Position,
    ) -> Registration<HeadingRecord> {
        let numbered = |path: Vec<u32>, display_text: String, style_key: &str| HeadingRecord {
            level,
            display_text,
            number_path: NumberPath::new(path),
            style_key: style_key.to_string(),
            position,
        };

        match (doc_type, level) {
            (_, 1) => {
                self.open_chapter();
                let chapter = self.chapter;
                let (display, style) = match doc_type {
                    DocType::Report => (
                        format!("CHAPTER {}: {}", chapter, text.to_uppercase()),
                        style_keys::CHAPTER,
                    ),
                    DocType::Synopsis => {
                        (format!("{}. {}", chapter, text), style_keys::SYNOPSIS_SECTION)
                    }
                };
                tracing::debug!(chapter, "registered chapter heading");
                Registration::Ok(numbered(vec![chapter], display, style))
            }
            (DocType::Report, 2) if self.chapter > 0 => {
                self.section += 1;
                self.subsection = 0;
                let display = format!("{}.{} {}", self.chapter, self.section, text);
                Registration::Ok(numbered(
                    vec![self.chapter, self.section],
                    display,
                    style_keys::SECTION,
                ))
            }
            (DocType::Report, 3) if self.section > 0 => {
                self.subsection += 1;
                let display = format!(
                    "{}.{}.{} {}",
                    self.chapter, self.section, self.subsection, text
                );
                Registration::Ok(numbered(
                    vec![self.chapter, self.section, self.subsection],
                    display,
                    style_keys::SUBSECTION,
                ))
            }
            _ => {
                let violation = self.classify_violation(level, text, doc_type);
                let style = match (doc_type, level) {
                    (DocType::Synopsis, _) => style_keys::NORMAL_TEXT,
                    (DocType::Report, 2) => style_keys::SECTION,
                    (DocType::Report, l) if l >= 3 => style_keys::SUBSECTION,
                    (DocType::Report, _) => style_keys::CHAPTER,
                };
                Registration::Warning(
                    HeadingRecord {
                        level,
                        display_text: text.to_string(),
                        number_path: NumberPath::unnumbered(),
                        style_key: style.to_string(),
                        position,
                    },
                    violation,
                )
            }
        }
    }

    /// Register a figure or table and return its number
    ///
    /// `[chapter, n]` inside a chapter, `[n]` before the first chapter.
    pub fn register_caption(&mut self, kind: CaptionKind) -> NumberPath {
        let counter = match kind {
            CaptionKind::Figure => &mut self.figure_in_chapter,
            CaptionKind::Table => &mut self.table_in_chapter,
        };
        *counter += 1;
        let index = *counter;

        if self.current_chapter > 0 {
            NumberPath::new(vec![self.current_chapter, index])
        } else {
            NumberPath::new(vec![index])
        }
    }

    fn open_chapter(&mut self) {
        self.chapter += 1;
        self.section = 0;
        self.subsection = 0;
        self.figure_in_chapter = 0;
        self.table_in_chapter = 0;
        self.current_chapter = self.chapter;
    }

    fn classify_violation(&self, level: u8, text: &str, doc_type: DocType) -> StructureViolation {
        let text = text.to_string();
        match (doc_type, level) {
            (DocType::Report, 2) => StructureViolation::NoOpenChapter { level, text },
            (DocType::Report, 3) if self.chapter == 0 => {
                StructureViolation::NoOpenChapter { level, text }
            }
            (DocType::Report, 3) => StructureViolation::NoOpenSection { text },
            _ => StructureViolation::LevelNotAllowed {
                level,
                text,
                doc_type,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(n: u64) -> Position {
        Position::new(n)
    }

    fn path(record: &Registration<HeadingRecord>) -> Vec<u32> {
        record.record().number_path.segments().to_vec()
    }

    #[test]
    fn test_report_heading_scenario() {
        let mut engine = NumberingEngine::new();
        let intro = engine.register_heading(1, "Introduction", DocType::Report, pos(0));
        let background = engine.register_heading(2, "Background", DocType::Report, pos(1));
        let design = engine.register_heading(1, "Design", DocType::Report, pos(2));

        assert_eq!(path(&intro), vec![1]);
        assert_eq!(path(&background), vec![1, 1]);
        assert_eq!(path(&design), vec![2]);

        assert_eq!(intro.record().display_text, "CHAPTER 1: INTRODUCTION");
        assert_eq!(background.record().display_text, "1.1 Background");
        assert_eq!(design.record().display_text, "CHAPTER 2: DESIGN");
        assert!(!intro.is_warning() && !background.is_warning() && !design.is_warning());
    }

    #[test]
    fn test_subsection_numbering_and_reset() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "Intro", DocType::Report, pos(0));
        engine.register_heading(2, "Scope", DocType::Report, pos(1));
        let a = engine.register_heading(3, "Inputs", DocType::Report, pos(2));
        let b = engine.register_heading(3, "Outputs", DocType::Report, pos(3));
        let section = engine.register_heading(2, "Limits", DocType::Report, pos(4));
        let c = engine.register_heading(3, "Memory", DocType::Report, pos(5));

        assert_eq!(path(&a), vec![1, 1, 1]);
        assert_eq!(b.record().display_text, "1.1.2 Outputs");
        assert_eq!(path(&section), vec![1, 2]);
        assert_eq!(path(&c), vec![1, 2, 1]);
        assert_eq!(c.record().style_key, style_keys::SUBSECTION);
    }

    #[test]
    fn test_section_without_chapter_degrades() {
        let mut engine = NumberingEngine::new();
        let result = engine.register_heading(2, "Orphan", DocType::Report, pos(0));

        assert!(result.is_warning());
        assert!(result.record().number_path.is_empty());
        assert_eq!(result.record().display_text, "Orphan");
        assert_eq!(result.record().style_key, style_keys::SECTION);
        assert!(matches!(
            result.violation(),
            Some(StructureViolation::NoOpenChapter { level: 2, .. })
        ));

        // Counters are untouched by the degraded heading
        let chapter = engine.register_heading(1, "Start", DocType::Report, pos(1));
        let section = engine.register_heading(2, "First", DocType::Report, pos(2));
        assert_eq!(path(&chapter), vec![1]);
        assert_eq!(path(&section), vec![1, 1]);
    }

    #[test]
    fn test_subsection_without_section_degrades() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "Intro", DocType::Report, pos(0));
        let result = engine.register_heading(3, "Too deep", DocType::Report, pos(1));

        assert!(matches!(
            result.violation(),
            Some(StructureViolation::NoOpenSection { .. })
        ));
        assert_eq!(result.violation().unwrap().code(), codes::STRUCTURE_ORDER);
    }

    #[test]
    fn test_new_chapter_closes_section_for_subsections() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "One", DocType::Report, pos(0));
        engine.register_heading(2, "One.One", DocType::Report, pos(1));
        engine.register_heading(1, "Two", DocType::Report, pos(2));
        let result = engine.register_heading(3, "Stray", DocType::Report, pos(3));
        assert!(result.is_warning());
    }

    #[test]
    fn test_synopsis_headings() {
        let mut engine = NumberingEngine::new();
        let first = engine.register_heading(1, "Introduction", DocType::Synopsis, pos(0));
        let second = engine.register_heading(1, "Methodology", DocType::Synopsis, pos(1));
        let sub = engine.register_heading(2, "Tools", DocType::Synopsis, pos(2));

        assert_eq!(first.record().display_text, "1. Introduction");
        assert_eq!(second.record().display_text, "2. Methodology");
        assert_eq!(first.record().style_key, style_keys::SYNOPSIS_SECTION);
        assert!(matches!(
            sub.violation(),
            Some(StructureViolation::LevelNotAllowed { level: 2, .. })
        ));
        assert_eq!(sub.record().style_key, style_keys::NORMAL_TEXT);
    }

    #[test]
    fn test_level_out_of_range_degrades() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "Intro", DocType::Report, pos(0));
        engine.register_heading(2, "Scope", DocType::Report, pos(1));
        engine.register_heading(3, "Detail", DocType::Report, pos(2));
        let result = engine.register_heading(4, "Deeper", DocType::Report, pos(3));

        assert!(matches!(
            result.violation(),
            Some(StructureViolation::LevelNotAllowed { level: 4, .. })
        ));
        assert_eq!(result.record().style_key, style_keys::SUBSECTION);
    }

    #[test]
    fn test_caption_counters_are_chapter_scoped() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "One", DocType::Report, pos(0));
        let f1 = engine.register_caption(CaptionKind::Figure);
        let f2 = engine.register_caption(CaptionKind::Figure);
        let t1 = engine.register_caption(CaptionKind::Table);
        engine.register_heading(1, "Two", DocType::Report, pos(1));
        let f3 = engine.register_caption(CaptionKind::Figure);
        let t2 = engine.register_caption(CaptionKind::Table);

        assert_eq!(f1.to_string(), "1.1");
        assert_eq!(f2.to_string(), "1.2");
        assert_eq!(t1.to_string(), "1.1");
        assert_eq!(f3.to_string(), "2.1");
        assert_eq!(t2.to_string(), "2.1");
    }

    #[test]
    fn test_sections_do_not_reset_caption_counters() {
        let mut engine = NumberingEngine::new();
        engine.register_heading(1, "One", DocType::Report, pos(0));
        engine.register_caption(CaptionKind::Figure);
        engine.register_heading(2, "Sub", DocType::Report, pos(1));
        let second = engine.register_caption(CaptionKind::Figure);
        assert_eq!(second.segments(), &[1, 2]);
    }

    #[test]
    fn test_caption_before_chapter_is_flat() {
        let mut engine = NumberingEngine::new();
        assert_eq!(engine.register_caption(CaptionKind::Figure).segments(), &[1]);
        assert_eq!(engine.register_caption(CaptionKind::Figure).segments(), &[2]);
        assert_eq!(engine.current_chapter(), 0);
    }

    #[test]
    fn test_third_figure_in_chapter_three() {
        let mut engine = NumberingEngine::new();
        for (i, title) in ["One", "Two", "Three"].iter().enumerate() {
            engine.register_heading(1, title, DocType::Report, pos(i as u64));
        }
        engine.register_caption(CaptionKind::Figure);
        engine.register_caption(CaptionKind::Figure);
        assert_eq!(
            engine.register_caption(CaptionKind::Figure).segments(),
            &[3, 3]
        );
    }

    #[test]
    fn test_violation_to_diagnostic() {
        let violation = StructureViolation::NoOpenChapter {
            level: 2,
            text: "Scope".to_string(),
        };
        let diag = violation.to_diagnostic();
        assert!(diag.is_warning());
        assert!(diag.has_code(codes::STRUCTURE_ORDER));
        assert!(diag.message.contains("'Scope'"));
    }
}
