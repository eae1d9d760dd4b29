//! Section content generation
//!
//! Builds a prompt per document section from the project data and asks a
//! [`TextGenerator`] for the body text. When generation fails or returns
//! nothing, a placeholder takes its place and a diagnostic is returned.

use std::fmt::Write;

use folio_config::ProjectData;
use folio_core::{codes, Diagnostic, DocType};

use crate::client::TextGenerator;

/// System message sent with every prompt
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful academic assistant drafting sections for a student project report. Write clearly, concisely, and professionally in the third person, focusing on the provided details. Avoid making up results or specific technical details not provided, but elaborate reasonably on the given concepts. IMPORTANT: Generate ONLY the body text for the requested section. Do NOT include the section title itself or any markdown formatting (like ## or **).";

/// Placeholder used when a section could not be generated
pub fn placeholder_text(section: &str) -> String {
    format!("[Content for '{}' could not be generated.]", section)
}

/// Which prompt a section gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Introduction,
    Abstract,
    Acknowledgement,
    LiteratureReview,
    ProblemAndObjectives,
    Methodology,
    Results,
    Conclusion,
    Other,
}

impl SectionKind {
    /// Classify a section by its name
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Introduction" => SectionKind::Introduction,
            "Abstract" => SectionKind::Abstract,
            "Acknowledgement" => SectionKind::Acknowledgement,
            "Background and Literature Review" => SectionKind::LiteratureReview,
            "Problem Statement and Objectives" => SectionKind::ProblemAndObjectives,
            "Methodology and Tools Used" | "System Design and Methodology" => {
                SectionKind::Methodology
            }
            "Implementation and Results" | "Expected Results and Contribution" => {
                SectionKind::Results
            }
            "Conclusion and Future Scope" => SectionKind::Conclusion,
            _ => SectionKind::Other,
        }
    }
}

/// Body text of one section
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSection {
    pub text: String,
    /// Set when the placeholder was used
    pub diagnostic: Option<Diagnostic>,
}

impl GeneratedSection {
    pub fn is_placeholder(&self) -> bool {
        self.diagnostic.is_some()
    }

    /// Text split into paragraphs at blank lines
    pub fn paragraphs(&self) -> Vec<&str> {
        self.text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Generates section text for a project
pub struct ContentGenerator {
    generator: Box<dyn TextGenerator>,
    system_message: String,
}

impl ContentGenerator {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }

    /// Replace the system message
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Generate the body of `section`, or its placeholder
    pub fn generate_section(
        &self,
        section: &str,
        doc_type: DocType,
        project: &ProjectData,
    ) -> GeneratedSection {
        tracing::info!(section, %doc_type, generator = self.generator.name(), "generating section");
        let prompt = build_prompt(section, doc_type, project);

        let failure = match self.generator.generate(&prompt, Some(&self.system_message)) {
            Ok(text) if !text.trim().is_empty() => {
                return GeneratedSection {
                    text,
                    diagnostic: None,
                }
            }
            Ok(_) => "generator returned no text".to_string(),
            Err(e) => e.to_string(),
        };

        GeneratedSection {
            text: placeholder_text(section),
            diagnostic: Some(
                Diagnostic::warning(format!("Content for '{}' could not be generated", section))
                    .with_code(codes::GENERATION_FAILED)
                    .with_note(failure),
            ),
        }
    }
}

impl std::fmt::Debug for ContentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("generator", &self.generator.name())
            .finish()
    }
}

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

/// Prompt for one section
pub fn build_prompt(section: &str, doc_type: DocType, project: &ProjectData) -> String {
    let kind = SectionKind::from_name(section);
    let summary = project
        .project_summary
        .as_deref()
        .unwrap_or("No summary provided.");
    let methodology = project
        .methodology_tools
        .as_deref()
        .unwrap_or("No methodology specified.");
    let results = project
        .results_summary
        .as_deref()
        .unwrap_or("No results summary provided.");
    let doc_name = doc_type.display_name();

    // Results sections take the title matching the document type
    let title = match (kind, doc_type) {
        (SectionKind::Results, DocType::Report) => "Implementation and Results",
        (SectionKind::Results, DocType::Synopsis) => "Expected Results and Contribution",
        _ => section,
    };

    let mut prompt = String::new();
    let _ = writeln!(prompt, "Project Title: {}", project.project_title);
    let _ = writeln!(prompt, "Project Summary: {}", summary);
    let _ = writeln!(prompt, "Document Type: {}", doc_name);
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "Instructions: Write ONLY the body content for the '{}' section. Do NOT include the section title itself or any markdown/formatting. Focus on the details below.\n",
        title
    );

    match kind {
        SectionKind::Introduction => {
            prompt.push_str("Content Focus:\n- Briefly introduce domain/relevance.\n- State core problem/motivation.\n- Mention main objectives (use list below).\n- Outline report/synopsis structure.\n");
            bullets(&mut prompt, "Specific points to consider:", &project.introduction_points);
            bullets(&mut prompt, "Project Objectives reference:", &project.objectives);
            prompt.push_str("Length: 2-4 paragraphs (Report), 1-2 paragraphs (Synopsis).");
        }
        SectionKind::Abstract => {
            prompt.push_str("Content Focus (under 250 words, single paragraph):\n- Purpose and scope.\n- Key methodology.\n- Main results/outcomes.\n- Primary conclusions.\n(Do NOT include references).\n");
            let _ = write!(
                prompt,
                "Base on: Objectives: {}\nMethodology: {}\nResults: {}\nConclusions: {}",
                project.objectives.join("; "),
                methodology,
                results,
                project.conclusions_future_scope.join("; ")
            );
        }
        SectionKind::Acknowledgement => {
            let _ = write!(
                prompt,
                "Content Focus:\n- Thank supervisor: {}.\n- Mention {} and {}.\n- Optional general thanks (faculty, friends etc.).\nLength: 1-2 paragraphs.",
                project.supervisor_name, project.department, project.college
            );
        }
        SectionKind::LiteratureReview => {
            prompt.push_str("Content Focus:\n- Background concepts.\n- Related work (techniques, tools, studies).\n- Gaps/limitations addressed by this project.\n");
            bullets(&mut prompt, "Incorporate topics/keywords:", &project.literature_review_ideas);
            prompt.push_str("Length: Several paragraphs (Report), 2-3 paragraphs (Synopsis).\nIMPORTANT: Describe concepts generally, do NOT invent specific citations like '[1]'.");
        }
        SectionKind::ProblemAndObjectives => {
            prompt.push_str("Content Focus:\n- Define the problem addressed.\n- List specific objectives (use list below or formulate plausible ones).\n");
            if project.objectives.is_empty() {
                prompt.push_str("(No objectives provided; formulate based on title/summary).\n");
            } else {
                bullets(&mut prompt, "Objectives:", &project.objectives);
            }
            prompt.push_str("Length: 1 paragraph problem statement, bulleted objectives.");
        }
        SectionKind::Methodology => {
            let _ = write!(
                prompt,
                "Content Focus:\n- Describe methodology, design, algorithms, frameworks, tools used/proposed based on: '{}'.\n- Explain relevance to objectives.\n- Detail design/architecture/workflow (Report) or provide high-level overview (Synopsis).",
                methodology
            );
        }
        SectionKind::Results => match doc_type {
            DocType::Report => {
                let _ = write!(
                    prompt,
                    "Content Focus:\n- Implementation details.\n- Key results/findings/metrics based on: '{}'.\n- Analysis/interpretation of results.\n- Mention figures/tables if relevant (e.g., 'Table X.Y summarizes...').",
                    results
                );
            }
            DocType::Synopsis => {
                let _ = write!(
                    prompt,
                    "Content Focus:\n- Expected outcomes.\n- How outcomes address the problem.\n- Potential significance/contribution.\nBase on expected results: '{}'.\nLength: 1-2 paragraphs.",
                    results
                );
            }
        },
        SectionKind::Conclusion => {
            prompt.push_str("Content Focus:\n- Summarize project achievements vs objectives.\n- Discuss limitations.\n- Suggest future research/enhancements.\n");
            bullets(&mut prompt, "Use provided points:", &project.conclusions_future_scope);
            prompt.push_str("Length: 1-2 paragraphs conclusion, 1 paragraph future scope.");
        }
        SectionKind::Other => {
            let _ = write!(
                prompt,
                "Write a general section about '{}' based on project title/summary. Keep concise.",
                section
            );
        }
    }

    let _ = write!(
        prompt,
        "\nEnsure output is suitable body text for a '{}'.",
        doc_name
    );
    prompt
}
