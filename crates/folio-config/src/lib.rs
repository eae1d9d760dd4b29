//! folio-config - rules, settings and project data
//!
//! Three inputs shape a folio build:
//!
//! - [`Guidelines`]: formatting and structure rules per document type
//! - [`Settings`]: runtime settings from `folio.toml`
//! - [`ProjectData`]: the project description, read from YAML

pub mod error;
pub mod guidelines;
pub mod project;
pub mod settings;

pub use error::{ConfigError, Result};
pub use guidelines::{
    Alignment, BackMatterItem, CommonRules, DocRules, Guidelines, Margins, PageLimits, StyleRule,
    TitleItem, CAPTION_STYLE, LIST_ENTRY_STYLE, LIST_HEADING_STYLE, PAGE_NUMBER_STYLE,
};
pub use project::{FigureHint, ProjectData, TableHint};
pub use settings::{GeneratorSettings, PathSettings, Settings, SETTINGS_FILE};
