//! Project data input
//!
//! The student's project description, read from a YAML file. Validation runs
//! on the raw mapping first so that every missing key is reported at once,
//! then the mapping is deserialized into [`ProjectData`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use folio_core::CaptionKind;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::{ConfigError, Result};

/// Keys that must be present and non-empty
pub const REQUIRED_KEYS: [&str; 8] = [
    "student_name",
    "roll_number",
    "project_title",
    "supervisor_name",
    "department",
    "college",
    "submission_month_year",
    "course_code",
];

/// Keys that must hold a sequence when present
pub const LIST_KEYS: [&str; 4] = [
    "objectives",
    "conclusions_future_scope",
    "introduction_points",
    "literature_review_ideas",
];

/// A figure to place in a body chapter
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FigureHint {
    /// Chapter or section name the figure belongs to
    pub chapter: String,
    pub caption: String,
    pub path: PathBuf,
}

/// A table to place in a body chapter
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableHint {
    pub chapter: String,
    pub caption: String,
    #[serde(deserialize_with = "scalar_rows")]
    pub rows: Vec<Vec<String>>,
    /// Whether the first row is a header row
    #[serde(default = "default_header")]
    pub header: bool,
}

fn default_header() -> bool {
    true
}

/// Validated project data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectData {
    #[serde(deserialize_with = "scalar")]
    pub student_name: String,
    #[serde(deserialize_with = "scalar")]
    pub roll_number: String,
    #[serde(deserialize_with = "scalar")]
    pub project_title: String,
    #[serde(deserialize_with = "scalar")]
    pub supervisor_name: String,
    #[serde(deserialize_with = "scalar")]
    pub department: String,
    #[serde(deserialize_with = "scalar")]
    pub college: String,
    #[serde(deserialize_with = "scalar")]
    pub submission_month_year: String,
    #[serde(deserialize_with = "scalar")]
    pub course_code: String,

    #[serde(default, deserialize_with = "optional_scalar")]
    pub supervisor_designation: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub project_summary: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub methodology_tools: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub results_summary: Option<String>,
    #[serde(default)]
    pub logo_image_path: Option<PathBuf>,

    #[serde(default, deserialize_with = "scalar_list")]
    pub objectives: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub conclusions_future_scope: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub introduction_points: Vec<String>,
    #[serde(default, deserialize_with = "scalar_list")]
    pub literature_review_ideas: Vec<String>,

    #[serde(default)]
    pub figures: Vec<FigureHint>,
    #[serde(default)]
    pub tables: Vec<TableHint>,

    /// Any other keys, available to title-page layouts by name
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl ProjectData {
    /// Parse and validate project data from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        validate(&value)?;
        Ok(serde_yaml::from_value(value)?)
    }

    /// Load project data from a file; relative paths inside it resolve
    /// against the file's directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut data = Self::from_yaml_str(&content)?;
        data.base_dir = path.parent().map(Path::to_path_buf);
        tracing::info!(
            path = %path.display(),
            title = %data.project_title,
            roll_number = %data.roll_number,
            "loaded project data"
        );
        Ok(data)
    }

    /// Scalar value of a key as text, `None` when absent or empty
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "student_name" => Some(self.student_name.clone()),
            "roll_number" => Some(self.roll_number.clone()),
            "project_title" => Some(self.project_title.clone()),
            "supervisor_name" => Some(self.supervisor_name.clone()),
            "department" => Some(self.department.clone()),
            "college" => Some(self.college.clone()),
            "submission_month_year" => Some(self.submission_month_year.clone()),
            "course_code" => Some(self.course_code.clone()),
            "supervisor_designation" => self.supervisor_designation.clone(),
            "project_summary" => self.project_summary.clone(),
            "methodology_tools" => self.methodology_tools.clone(),
            "results_summary" => self.results_summary.clone(),
            "logo_image_path" => self
                .logo_image_path
                .as_ref()
                .map(|p| p.display().to_string()),
            other => self.extra.get(other).and_then(scalar_text),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Resolve a path from the project file against its directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Figure hints for a chapter, matched by name ignoring case
    pub fn figures_for<'a>(&'a self, chapter: &'a str) -> impl Iterator<Item = &'a FigureHint> {
        self.figures
            .iter()
            .filter(move |hint| same_chapter(&hint.chapter, chapter))
    }

    /// Table hints for a chapter, matched by name ignoring case
    pub fn tables_for<'a>(&'a self, chapter: &'a str) -> impl Iterator<Item = &'a TableHint> {
        self.tables
            .iter()
            .filter(move |hint| same_chapter(&hint.chapter, chapter))
    }

    /// Hints whose chapter is none of `chapters`, as `(kind, chapter, caption)`
    pub fn unplaced_hints(&self, chapters: &[&str]) -> Vec<(CaptionKind, &str, &str)> {
        let unplaced = |chapter: &str| !chapters.iter().any(|c| same_chapter(chapter, c));
        let figures = self
            .figures
            .iter()
            .filter(|hint| unplaced(&hint.chapter))
            .map(|hint| (CaptionKind::Figure, hint.chapter.as_str(), hint.caption.as_str()));
        let tables = self
            .tables
            .iter()
            .filter(|hint| unplaced(&hint.chapter))
            .map(|hint| (CaptionKind::Table, hint.chapter.as_str(), hint.caption.as_str()));
        figures.chain(tables).collect()
    }
}

fn same_chapter(hint: &str, chapter: &str) -> bool {
    hint.trim().eq_ignore_ascii_case(chapter.trim())
}

fn validate(value: &Value) -> Result<()> {
    let mapping = value.as_mapping().ok_or(ConfigError::NotAMapping)?;

    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| mapping.get(**key).map_or(true, is_empty_value))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys(missing));
    }

    for key in LIST_KEYS {
        match mapping.get(key) {
            None | Some(Value::Null) | Some(Value::Sequence(_)) => {}
            Some(other) => {
                return Err(ConfigError::NotAList {
                    key: key.to_string(),
                    found: type_name(other).to_string(),
                })
            }
        }
    }

    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Text of a scalar; numbers and booleans are written out
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| serde::de::Error::custom(format!("expected text, found {}", type_name(&value))))
}

fn optional_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_text(&other)
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| {
                serde::de::Error::custom(format!("expected text, found {}", type_name(&other)))
            }),
    }
}

fn scalar_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(items.iter().filter_map(scalar_text).collect()),
        other => Err(serde::de::Error::custom(format!(
            "expected a list, found {}",
            type_name(&other)
        ))),
    }
}

fn scalar_rows<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Vec<Value>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| scalar_text(cell).unwrap_or_default())
                .collect()
        })
        .collect())
}
