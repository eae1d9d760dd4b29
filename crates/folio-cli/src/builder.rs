//! Report builder
//!
//! Drives a [`DocumentSession`] through the fixed layout of a report or
//! synopsis: title page, front matter (reports only), body chapters, back
//! matter. The finished document is rendered to `{DocType}_{roll}.docx`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use folio_config::{Guidelines, ProjectData, LIST_HEADING_STYLE};
use folio_core::{
    codes, style_keys, AssembledDocument, CaptionKind, Diagnostic, DocType, DocumentSession,
    FigureImage, ListKind, RegionKind,
};
use folio_generate::ContentGenerator;
use folio_ooxml::{DocumentProperties, DocxRenderer};

/// Declaration paragraphs from this line on are set as the signature block
const SIGNATURE_MARKER: &str = "(Signature)";

/// Result of one build
#[derive(Debug)]
pub struct BuildOutput {
    /// Where the document was written
    pub path: PathBuf,
    pub document: AssembledDocument,
    /// Everything degraded while building and rendering, in order
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

/// Builds reports and synopses from project data
pub struct ReportBuilder<'g> {
    guidelines: &'g Guidelines,
    content: ContentGenerator,
    output_dir: PathBuf,
}

impl<'g> ReportBuilder<'g> {
    pub fn new(
        guidelines: &'g Guidelines,
        content: ContentGenerator,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            guidelines,
            content,
            output_dir: output_dir.into(),
        }
    }

    /// File the document for `project` is written to
    pub fn output_path(&self, doc_type: DocType, project: &ProjectData) -> PathBuf {
        let roll: String = project
            .roll_number
            .trim()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.output_dir
            .join(format!("{}_{}.docx", doc_type.display_name(), roll))
    }

    /// Assemble, render and write one document
    pub fn build(&self, doc_type: DocType, project: &ProjectData) -> Result<BuildOutput> {
        tracing::info!(
            %doc_type,
            title = %project.project_title,
            generator = self.content.generator_name(),
            "starting build"
        );
        let document = self.assemble(doc_type, project);

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;
        let path = self.output_path(doc_type, project);
        let renderer = DocxRenderer::new(self.guidelines).with_properties(DocumentProperties {
            title: Some(project.project_title.clone()),
            author: Some(project.student_name.clone()),
            subject: Some(format!("Project {}", doc_type.display_name())),
        });
        let render_diagnostics = renderer
            .render_to_file(&document, &path)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;

        let mut diagnostics: Vec<Diagnostic> = document.diagnostics.iter().cloned().collect();
        diagnostics.extend(render_diagnostics);
        tracing::info!(
            path = %path.display(),
            diagnostics = diagnostics.len(),
            "build finished"
        );

        Ok(BuildOutput {
            path,
            document,
            diagnostics,
        })
    }

    /// Run the content stream through a session and finalize it
    pub fn assemble(&self, doc_type: DocType, project: &ProjectData) -> AssembledDocument {
        let (figure_prefix, table_prefix) = self.guidelines.caption_prefixes();
        let mut session = DocumentSession::new(doc_type)
            .with_caption_prefixes(figure_prefix, table_prefix);

        self.title_page(&mut session, project);
        if doc_type == DocType::Report {
            self.front_matter(&mut session, project);
        }

        session.start_region(RegionKind::Body);
        let sections: Vec<&str> = match doc_type {
            DocType::Report => self
                .guidelines
                .report_chapters()
                .iter()
                .map(String::as_str)
                .collect(),
            DocType::Synopsis => self.guidelines.body_sections(doc_type),
        };
        for section in &sections {
            self.body_section(&mut session, section, project);
        }
        for (kind, chapter, caption) in project.unplaced_hints(&sections) {
            let kind = match kind {
                CaptionKind::Figure => "Figure",
                CaptionKind::Table => "Table",
            };
            session.push_diagnostic(
                Diagnostic::warning(format!(
                    "{} '{}' names chapter '{}', which this {} does not have; it was not placed",
                    kind, caption, chapter, doc_type
                ))
                .with_code(codes::HINT_UNPLACED)
                .with_help("Use one of the chapter names listed below")
                .with_note(format!("chapters: {}", sections.join(", "))),
            );
        }

        for item in self.guidelines.back_matter(doc_type) {
            session.add_heading(1, &item.title);
            session.add_paragraph(item.placeholder.as_str(), style_keys::NORMAL_TEXT);
        }

        session.finalize(&self.guidelines.page_numbering(doc_type))
    }

    fn title_page(&self, session: &mut DocumentSession, project: &ProjectData) {
        session.start_region(RegionKind::TitlePage);
        for item in self.guidelines.title_page_layout(session.doc_type()) {
            if item.logo {
                if let Some(path) = &project.logo_image_path {
                    match load_image(&project.resolve_path(path)) {
                        Ok(image) => session.add_image(image),
                        Err(diagnostic) => session.push_diagnostic(diagnostic),
                    }
                }
                continue;
            }
            let text = item.resolve(|key| project.get(key));
            session.add_paragraph(text, item.style.as_str());
        }
        session.add_page_break();
    }

    fn front_matter(&self, session: &mut DocumentSession, project: &ProjectData) {
        session.start_region(RegionKind::FrontMatter);

        if let Some(declaration) = self.guidelines.render_declaration(|key| project.get(key)) {
            session.add_paragraph("DECLARATION", "declaration_heading");
            let mut style = "declaration_body";
            for paragraph in declaration.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
                if paragraph.starts_with(SIGNATURE_MARKER) {
                    style = "declaration_signature";
                }
                session.add_paragraph(paragraph, style);
            }
            session.add_page_break();
        }

        for (heading, section, style) in [
            ("ACKNOWLEDGEMENT", "Acknowledgement", "acknowledgement"),
            ("ABSTRACT", "Abstract", "abstract"),
        ] {
            session.add_paragraph(heading, LIST_HEADING_STYLE);
            let generated = self
                .content
                .generate_section(section, DocType::Report, project);
            for paragraph in generated.paragraphs() {
                session.add_paragraph(paragraph, style);
            }
            if let Some(diagnostic) = generated.diagnostic {
                session.push_diagnostic(diagnostic);
            }
            session.add_page_break();
        }

        for list in ListKind::ALL {
            session.add_paragraph(list.heading(), LIST_HEADING_STYLE);
            session.reserve_list(list);
            session.add_page_break();
        }
    }

    fn body_section(&self, session: &mut DocumentSession, section: &str, project: &ProjectData) {
        session.add_heading(1, section);

        let generated = self
            .content
            .generate_section(section, session.doc_type(), project);
        for paragraph in generated.paragraphs() {
            session.add_paragraph(paragraph, style_keys::NORMAL_TEXT);
        }
        if let Some(diagnostic) = generated.diagnostic {
            session.push_diagnostic(diagnostic);
        }

        for hint in project.figures_for(section) {
            let path = project.resolve_path(&hint.path);
            match load_image(&path) {
                Ok(image) => {
                    session.add_figure(&hint.caption, Some(image));
                }
                Err(diagnostic) => {
                    session.push_diagnostic(diagnostic);
                    session.add_paragraph(
                        format!("[Image not found: {}]", path.display()),
                        style_keys::NORMAL_TEXT,
                    );
                    session.add_figure(&hint.caption, None);
                }
            }
        }
        for hint in project.tables_for(section) {
            session.add_table(&hint.caption, hint.rows.clone(), hint.header);
        }
    }
}

/// Read an image file, or describe why it could not be read
fn load_image(path: &Path) -> std::result::Result<FigureImage, Diagnostic> {
    match fs::read(path) {
        Ok(data) => {
            tracing::debug!(path = %path.display(), bytes = data.len(), "loaded image");
            Ok(FigureImage {
                file_name: path.display().to_string(),
                data,
            })
        }
        Err(e) => Err(Diagnostic::warning(format!(
            "Image not found: {}",
            path.display()
        ))
        .with_code(codes::IMAGE_MISSING)
        .with_help("Check the path in the project data file")
        .with_note(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::BlockKind;
    use folio_generate::{PlaceholderGenerator, TextGenerator};

    const PROJECT: &str = r#"
student_name: Asha Verma
roll_number: 21CS042
project_title: Smart Irrigation Using IoT
supervisor_name: Dr. R. K. Sharma
department: Department of Computer Science
college: Guru Jambheshwar University
submission_month_year: May 2025
course_code: MCS-401
tables:
  - chapter: Implementation and Results
    caption: Sensor accuracy
    rows:
      - [Sensor, Error]
      - [Moisture, 2%]
figures:
  - chapter: System Design and Methodology
    caption: Block diagram
    path: /nonexistent/block.png
"#;

    struct Echo;

    impl TextGenerator for Echo {
        fn generate(&self, _prompt: &str, _system: Option<&str>) -> folio_generate::Result<String> {
            Ok("First paragraph.\n\nSecond paragraph.".to_string())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn builder<'g>(guidelines: &'g Guidelines, generator: Box<dyn TextGenerator>) -> ReportBuilder<'g> {
        ReportBuilder::new(guidelines, ContentGenerator::new(generator), "out")
    }

    fn project() -> ProjectData {
        ProjectData::from_yaml_str(PROJECT).unwrap()
    }

    fn paragraphs<'a>(doc: &'a AssembledDocument, style: &str) -> Vec<&'a str> {
        doc.blocks
            .iter()
            .filter_map(|b| match &b.kind {
                BlockKind::Paragraph { text, style_key } if style_key == style => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_output_path() {
        let guidelines = Guidelines::builtin();
        let builder = builder(&guidelines, Box::new(PlaceholderGenerator));
        let mut data = project();
        assert_eq!(
            builder.output_path(DocType::Report, &data),
            Path::new("out").join("Report_21CS042.docx")
        );
        data.roll_number = "21/CS/042".to_string();
        assert_eq!(
            builder.output_path(DocType::Synopsis, &data),
            Path::new("out").join("Synopsis_21_CS_042.docx")
        );
    }

    #[test]
    fn test_report_layout() {
        let guidelines = Guidelines::builtin();
        let doc = builder(&guidelines, Box::new(Echo)).assemble(DocType::Report, &project());

        let kinds: Vec<RegionKind> = doc.regions.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RegionKind::TitlePage, RegionKind::FrontMatter, RegionKind::Body]
        );

        let chapters: Vec<&str> = doc
            .headings
            .iter()
            .map(|h| h.display_text.as_str())
            .collect();
        assert_eq!(
            chapters,
            vec![
                "CHAPTER 1: INTRODUCTION",
                "CHAPTER 2: BACKGROUND AND LITERATURE REVIEW",
                "CHAPTER 3: SYSTEM DESIGN AND METHODOLOGY",
                "CHAPTER 4: IMPLEMENTATION AND RESULTS",
                "CHAPTER 5: CONCLUSION AND FUTURE SCOPE",
                "CHAPTER 6: REFERENCES",
                "CHAPTER 7: APPENDICES",
            ]
        );
        assert_eq!(doc.list_entries(ListKind::Contents).count(), 7);
        assert_eq!(paragraphs(&doc, "abstract").len(), 2);
    }

    #[test]
    fn test_title_page_fills_and_marks_values() {
        let guidelines = Guidelines::builtin();
        let doc = builder(&guidelines, Box::new(Echo)).assemble(DocType::Report, &project());

        assert_eq!(
            paragraphs(&doc, "title_sub"),
            vec!["By", "Asha Verma", "(Roll No.: 21CS042)"]
        );
        assert!(paragraphs(&doc, "title_supervisor").contains(&"[supervisor_designation]"));
    }

    #[test]
    fn test_declaration_is_split_into_body_and_signature() {
        let guidelines = Guidelines::builtin();
        let doc = builder(&guidelines, Box::new(Echo)).assemble(DocType::Report, &project());

        let body = paragraphs(&doc, "declaration_body");
        assert_eq!(body.len(), 2);
        assert!(body[0].contains("\"Smart Irrigation Using IoT\""));
        let signature = paragraphs(&doc, "declaration_signature");
        assert_eq!(signature[0], "(Signature)");
        assert!(signature[1].starts_with("Asha Verma\nRoll No.: 21CS042"));
    }

    #[test]
    fn test_hints_land_in_their_chapter() {
        let guidelines = Guidelines::builtin();
        let doc = builder(&guidelines, Box::new(Echo)).assemble(DocType::Report, &project());

        let captions: Vec<&str> = doc
            .captions
            .iter()
            .map(|c| c.full_caption_text.as_str())
            .collect();
        assert_eq!(captions, vec!["Fig 3.1: Block diagram", "Table 4.1: Sensor accuracy"]);

        assert_eq!(doc.diagnostics.count_code(codes::IMAGE_MISSING), 1);
        assert!(paragraphs(&doc, style_keys::NORMAL_TEXT)
            .iter()
            .any(|p| p.starts_with("[Image not found: ")));
    }

    #[test]
    fn test_hint_with_unknown_chapter_is_reported() {
        let guidelines = Guidelines::builtin();
        let yaml = PROJECT.replace(
            "chapter: Implementation and Results",
            "chapter: Implementaton and Results",
        );
        let data = ProjectData::from_yaml_str(&yaml).unwrap();
        let doc = builder(&guidelines, Box::new(Echo)).assemble(DocType::Report, &data);

        assert_eq!(doc.captions.len(), 1);
        let unplaced: Vec<&Diagnostic> = doc
            .diagnostics
            .iter()
            .filter(|d| d.has_code(codes::HINT_UNPLACED))
            .collect();
        assert_eq!(unplaced.len(), 1);
        assert!(unplaced[0].is_warning());
        assert!(unplaced[0].message.contains("'Sensor accuracy'"));
        assert!(unplaced[0].message.contains("'Implementaton and Results'"));
        assert!(unplaced[0].notes[0].contains("Implementation and Results"));
    }

    #[test]
    fn test_offline_synopsis_uses_placeholders() {
        let guidelines = Guidelines::builtin();
        let doc = builder(&guidelines, Box::new(PlaceholderGenerator))
            .assemble(DocType::Synopsis, &project());

        let kinds: Vec<RegionKind> = doc.regions.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RegionKind::TitlePage, RegionKind::Body]);
        assert!(doc.list_entries(ListKind::Contents).next().is_none());

        let titles: Vec<&str> = doc
            .headings
            .iter()
            .map(|h| h.display_text.as_str())
            .collect();
        assert_eq!(titles.first(), Some(&"1. Introduction"));
        assert_eq!(titles.last(), Some(&"6. References"));

        // Five body sections, none generated
        assert_eq!(doc.diagnostics.count_code(codes::GENERATION_FAILED), 5);
        // Both hints name report chapters
        assert_eq!(doc.diagnostics.count_code(codes::HINT_UNPLACED), 2);
        assert!(doc.captions.is_empty());
        assert!(paragraphs(&doc, style_keys::NORMAL_TEXT)
            .contains(&"[Content for 'Introduction' could not be generated.]"));
    }
}
