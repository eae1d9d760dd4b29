//! Guideline rules
//!
//! Static formatting and structure rules for each document type: paragraph
//! styles, margins, page numbering, title-page layout, body section order and
//! the declaration template. [`Guidelines::builtin`] carries the institutional
//! defaults; a TOML file with the same schema can replace any top-level part.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use folio_core::{
    codes, style_keys, DocType, Diagnostic, FooterPosition, NumberFormat, PageNumberingRules,
};

use crate::error::{ConfigError, Result};

const TIMES_NEW_ROMAN: &str = "Times New Roman";

/// Style key of front-matter headings (lists, acknowledgement, abstract)
pub const LIST_HEADING_STYLE: &str = "heading_list_toc";
/// Style key of list entries
pub const LIST_ENTRY_STYLE: &str = "list_entry";
/// Style key of figure and table captions
pub const CAPTION_STYLE: &str = "caption";
/// Style key of page numbers in footers
pub const PAGE_NUMBER_STYLE: &str = "page_number";

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Formatting of one paragraph style
///
/// Sizes and spacing are in points, indents in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    pub font: String,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub all_caps: bool,
    pub align: Alignment,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: Option<f32>,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub first_line_indent_in: Option<f32>,
    pub hanging_indent_in: Option<f32>,
    pub keep_with_next: bool,
    pub page_break_before: bool,
}

impl Default for StyleRule {
    fn default() -> Self {
        Self {
            font: TIMES_NEW_ROMAN.to_string(),
            size_pt: 12.0,
            bold: false,
            italic: false,
            underline: false,
            all_caps: false,
            align: Alignment::Left,
            line_spacing: None,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
            first_line_indent_in: None,
            hanging_indent_in: None,
            keep_with_next: false,
            page_break_before: false,
        }
    }
}

impl StyleRule {
    /// Times New Roman at the given size
    pub fn sized(size_pt: f32) -> Self {
        Self {
            size_pt,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn all_caps(mut self) -> Self {
        self.all_caps = true;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn line_spacing(mut self, multiple: f32) -> Self {
        self.line_spacing = Some(multiple);
        self
    }

    pub fn spacing(mut self, before_pt: f32, after_pt: f32) -> Self {
        self.space_before_pt = before_pt;
        self.space_after_pt = after_pt;
        self
    }

    pub fn first_line_indent(mut self, inches: f32) -> Self {
        self.first_line_indent_in = Some(inches);
        self
    }

    pub fn hanging_indent(mut self, inches: f32) -> Self {
        self.hanging_indent_in = Some(inches);
        self
    }

    pub fn keep_with_next(mut self) -> Self {
        self.keep_with_next = true;
        self
    }

    pub fn page_break_before(mut self) -> Self {
        self.page_break_before = true;
        self
    }
}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top_in: f32,
    pub bottom_in: f32,
    pub left_in: f32,
    pub right_in: f32,
    /// Extra space on the binding side
    pub binding_in: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top_in: 1.0,
            bottom_in: 1.0,
            left_in: 1.25,
            right_in: 1.0,
            binding_in: 0.0,
        }
    }
}

/// Expected body length in pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLimits {
    pub min: u32,
    pub max: u32,
}

/// One line of the title page
///
/// Renders as `{prefix}{value}{suffix}` where the value is `text`, or the
/// project value named by `key`, or `[key]` when that value is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleItem {
    /// Place the project logo here instead of text
    pub logo: bool,
    pub text: Option<String>,
    pub key: Option<String>,
    pub style: String,
    pub prefix: String,
    pub suffix: String,
}

impl TitleItem {
    fn literal(text: &str, style: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            style: style.to_string(),
            ..Self::default()
        }
    }

    fn field(key: &str, style: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            style: style.to_string(),
            ..Self::default()
        }
    }

    fn wrapped(mut self, prefix: &str, suffix: &str) -> Self {
        self.prefix = prefix.to_string();
        self.suffix = suffix.to_string();
        self
    }

    /// Final text of the item, looking project values up by key
    pub fn resolve<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = match (&self.text, &self.key) {
            (Some(text), _) if !text.is_empty() => text.clone(),
            (_, Some(key)) => lookup(key).unwrap_or_else(|| format!("[{}]", key)),
            _ => String::new(),
        };
        format!("{}{}{}", self.prefix, value, self.suffix)
    }
}

/// A closing section with placeholder content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackMatterItem {
    pub title: String,
    pub placeholder: String,
}

/// Rules shared by every document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonRules {
    pub page_size: String,
    pub figure_prefix: String,
    pub table_prefix: String,
    pub reference_style: String,
}

impl Default for CommonRules {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            figure_prefix: "Fig".to_string(),
            table_prefix: "Table".to_string(),
            reference_style: "IEEE".to_string(),
        }
    }
}

/// Rules of one document type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocRules {
    pub page_limits: PageLimits,
    pub margins: Margins,
    pub page_numbering: PageNumberingRules,
    pub formatting_styles: BTreeMap<String, StyleRule>,
    /// Body sections (synopsis) or chapters (report), in order
    pub section_order: Vec<String>,
    pub back_matter: Vec<BackMatterItem>,
    pub title_page_layout: Vec<TitleItem>,
    /// Declaration body with `{key}` placeholders
    pub declaration_text: Option<String>,
}

/// The complete guideline rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guidelines {
    pub common: CommonRules,
    pub report: DocRules,
    pub synopsis: DocRules,
    /// Style used when a style key is unknown
    pub fallback_style: StyleRule,
}

impl Default for Guidelines {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Guidelines {
    /// Parse guidelines from TOML; absent top-level parts keep the built-in rules
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load guidelines from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let guidelines = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded guidelines");
        Ok(guidelines)
    }

    /// Rules for one document type
    pub fn rules(&self, doc_type: DocType) -> &DocRules {
        match doc_type {
            DocType::Report => &self.report,
            DocType::Synopsis => &self.synopsis,
        }
    }

    /// Formatting style registered under `style_key`
    pub fn formatting_rule(&self, doc_type: DocType, style_key: &str) -> Option<&StyleRule> {
        self.rules(doc_type).formatting_styles.get(style_key)
    }

    /// Formatting style for `style_key`, or the fallback style with a warning
    pub fn style_or_default(
        &self,
        doc_type: DocType,
        style_key: &str,
    ) -> (&StyleRule, Option<Diagnostic>) {
        match self.formatting_rule(doc_type, style_key) {
            Some(rule) => (rule, None),
            None => {
                let diagnostic = Diagnostic::warning(format!(
                    "Formatting style '{}' not found for {}; using default",
                    style_key, doc_type
                ))
                .with_code(codes::STYLE_FALLBACK)
                .with_note(format!(
                    "default is {} {}pt",
                    self.fallback_style.font, self.fallback_style.size_pt
                ));
                (&self.fallback_style, Some(diagnostic))
            }
        }
    }

    pub fn page_numbering(&self, doc_type: DocType) -> PageNumberingRules {
        self.rules(doc_type).page_numbering
    }

    pub fn margins(&self, doc_type: DocType) -> Margins {
        self.rules(doc_type).margins
    }

    pub fn section_order(&self, doc_type: DocType) -> &[String] {
        &self.rules(doc_type).section_order
    }

    /// Chapters of a report body
    pub fn report_chapters(&self) -> &[String] {
        &self.report.section_order
    }

    /// Sections that carry generated body text
    ///
    /// References are produced as back matter, so they are left out.
    pub fn body_sections(&self, doc_type: DocType) -> Vec<&str> {
        self.section_order(doc_type)
            .iter()
            .map(String::as_str)
            .filter(|name| !name.eq_ignore_ascii_case("references"))
            .collect()
    }

    pub fn back_matter(&self, doc_type: DocType) -> &[BackMatterItem] {
        &self.rules(doc_type).back_matter
    }

    pub fn title_page_layout(&self, doc_type: DocType) -> &[TitleItem] {
        &self.rules(doc_type).title_page_layout
    }

    /// Declaration text of a report, placeholders filled in
    ///
    /// `{submission_date}` takes the submission month and year; other
    /// placeholders are looked up directly. Missing values render as `[key]`.
    pub fn render_declaration<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let template = self.report.declaration_text.as_deref()?;
        Some(fill_placeholders(template, |key| match key {
            "submission_date" => {
                lookup("submission_month_year").unwrap_or_else(|| "[Date]".to_string())
            }
            other => lookup(other).unwrap_or_else(|| format!("[{}]", other)),
        }))
    }

    /// Prefixes for figure and table captions
    pub fn caption_prefixes(&self) -> (&str, &str) {
        (&self.common.figure_prefix, &self.common.table_prefix)
    }

    /// The built-in rule set
    pub fn builtin() -> Self {
        Self {
            common: CommonRules::default(),
            report: builtin_report(),
            synopsis: builtin_synopsis(),
            fallback_style: StyleRule::default(),
        }
    }
}

/// Replace every `{name}` in `template`; unmatched braces are kept
fn fill_placeholders<F>(template: &str, value: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close)
                if close > 0
                    && after[..close]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                out.push_str(&value(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn title_styles() -> Vec<(&'static str, StyleRule)> {
    vec![
        (
            "title_main",
            StyleRule::sized(18.0)
                .bold()
                .all_caps()
                .align(Alignment::Center)
                .spacing(0.0, 18.0),
        ),
        (
            "title_sub",
            StyleRule::sized(14.0).bold().align(Alignment::Center),
        ),
        ("title_info", StyleRule::sized(12.0).align(Alignment::Center)),
        (
            "title_supervisor",
            StyleRule::sized(14.0).bold().align(Alignment::Right),
        ),
        (
            "title_dept",
            StyleRule::sized(16.0).bold().align(Alignment::Center),
        ),
    ]
}

fn title_layout(kind: &str) -> Vec<TitleItem> {
    vec![
        TitleItem {
            logo: true,
            ..TitleItem::default()
        },
        TitleItem::field("project_title", "title_main"),
        TitleItem::literal(
            &format!("A Project {} Submitted for the Degree of", kind),
            "title_info",
        ),
        TitleItem::field("course_code", "title_info").wrapped("Master of Computer Science (", ")"),
        TitleItem::literal("By", "title_sub"),
        TitleItem::field("student_name", "title_sub"),
        TitleItem::field("roll_number", "title_sub").wrapped("(Roll No.: ", ")"),
        TitleItem::literal("Under the Supervision of", "title_supervisor"),
        TitleItem::field("supervisor_name", "title_supervisor"),
        TitleItem::field("supervisor_designation", "title_supervisor"),
        TitleItem::field("department", "title_dept"),
        TitleItem::field("college", "title_dept"),
        TitleItem::field("submission_month_year", "title_info"),
    ]
}

fn builtin_report() -> DocRules {
    let mut styles: BTreeMap<String, StyleRule> = BTreeMap::new();
    let body = StyleRule::sized(12.0).line_spacing(1.5);
    let entries = vec![
        (style_keys::NORMAL_TEXT, body.clone().first_line_indent(0.5)),
        ("abstract", body.clone()),
        ("acknowledgement", body.clone()),
        (LIST_ENTRY_STYLE, body.clone()),
        (
            CAPTION_STYLE,
            StyleRule::sized(10.0)
                .line_spacing(1.0)
                .align(Alignment::Center)
                .spacing(6.0, 12.0),
        ),
        (
            "reference",
            StyleRule::sized(10.0).line_spacing(1.0).hanging_indent(0.5),
        ),
        (PAGE_NUMBER_STYLE, StyleRule::sized(10.0)),
        (
            style_keys::CHAPTER,
            StyleRule::sized(16.0)
                .bold()
                .all_caps()
                .align(Alignment::Center)
                .spacing(24.0, 18.0)
                .keep_with_next()
                .page_break_before(),
        ),
        (
            style_keys::SECTION,
            StyleRule::sized(14.0).bold().spacing(12.0, 6.0).keep_with_next(),
        ),
        (
            style_keys::SUBSECTION,
            StyleRule::sized(12.0).bold().spacing(10.0, 4.0).keep_with_next(),
        ),
        (
            LIST_HEADING_STYLE,
            StyleRule::sized(14.0)
                .bold()
                .all_caps()
                .align(Alignment::Center)
                .spacing(0.0, 18.0),
        ),
        (
            "declaration_heading",
            StyleRule::sized(14.0)
                .bold()
                .underline()
                .align(Alignment::Center)
                .spacing(0.0, 18.0),
        ),
        (
            "declaration_body",
            body.clone().align(Alignment::Justify),
        ),
        (
            "declaration_signature",
            StyleRule::sized(12.0).align(Alignment::Right).spacing(36.0, 0.0),
        ),
    ];
    for (key, rule) in entries.into_iter().chain(title_styles()) {
        styles.insert(key.to_string(), rule);
    }

    DocRules {
        page_limits: PageLimits { min: 40, max: 70 },
        margins: Margins {
            top_in: 1.0,
            bottom_in: 1.0,
            left_in: 1.5,
            right_in: 1.0,
            binding_in: 0.5,
        },
        page_numbering: PageNumberingRules {
            front_format: NumberFormat::RomanLower,
            body_format: NumberFormat::Arabic,
            position: FooterPosition::BottomCenter,
            start_page: 1,
        },
        formatting_styles: styles,
        section_order: [
            "Introduction",
            "Background and Literature Review",
            "System Design and Methodology",
            "Implementation and Results",
            "Conclusion and Future Scope",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        back_matter: vec![
            BackMatterItem {
                title: "REFERENCES".to_string(),
                placeholder: "[References list should be added here according to IEEE format as per guidelines.]".to_string(),
            },
            BackMatterItem {
                title: "APPENDICES".to_string(),
                placeholder: "[Include any appendices here, such as source code snippets (if allowed/required), complex diagrams, or detailed data tables.]".to_string(),
            },
        ],
        title_page_layout: title_layout("Report"),
        declaration_text: Some(
            "I hereby declare that the project work entitled \"{project_title}\" is an authentic record of my own work carried out under the supervision of {supervisor_name}.\n\n\
             I further declare that the work reported in this project has not been submitted, either in part or in full, for the award of any other degree or diploma in this institute or any other institute or university.\n\n\
             (Signature)\n\n\
             {student_name}\n\
             Roll No.: {roll_number}\n\
             Date: {submission_date} Place: Hisar"
                .to_string(),
        ),
    }
}

fn builtin_synopsis() -> DocRules {
    let mut styles: BTreeMap<String, StyleRule> = BTreeMap::new();
    let entries = vec![
        (
            style_keys::NORMAL_TEXT,
            StyleRule::sized(12.0)
                .line_spacing(1.5)
                .align(Alignment::Justify),
        ),
        (
            style_keys::SYNOPSIS_SECTION,
            StyleRule::sized(14.0).bold().spacing(12.0, 6.0),
        ),
        (
            CAPTION_STYLE,
            StyleRule::sized(10.0)
                .line_spacing(1.0)
                .align(Alignment::Center)
                .spacing(6.0, 12.0),
        ),
        (PAGE_NUMBER_STYLE, StyleRule::sized(10.0)),
    ];
    for (key, rule) in entries.into_iter().chain(title_styles()) {
        styles.insert(key.to_string(), rule);
    }

    DocRules {
        page_limits: PageLimits { min: 6, max: 10 },
        margins: Margins::default(),
        page_numbering: PageNumberingRules {
            front_format: NumberFormat::Arabic,
            body_format: NumberFormat::Arabic,
            position: FooterPosition::BottomCenter,
            start_page: 1,
        },
        formatting_styles: styles,
        section_order: [
            "Introduction",
            "Background and Literature Review",
            "Problem Statement and Objectives",
            "Methodology and Tools Used",
            "Expected Results and Contribution",
            "References",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        back_matter: vec![BackMatterItem {
            title: "References".to_string(),
            placeholder: "[References list should be added here according to IEEE format as per guidelines.]".to_string(),
        }],
        title_page_layout: title_layout("Synopsis"),
        declaration_text: None,
    }
}
