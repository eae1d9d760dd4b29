//! folio CLI - Command-line interface library
//!
//! This library provides the CLI functionality for folio:
//! - Build: assemble a report or synopsis from project data into DOCX
//! - Check: verify the Ollama server and model
//!
//! # Library Usage
//!
//! ```ignore
//! use folio_cli::{build_command, BuildOptions};
//! use folio_core::DocType;
//!
//! let options = BuildOptions {
//!     project: Some("project_data.yaml".into()),
//!     offline: true,
//!     ..BuildOptions::default()
//! };
//! let output = build_command(DocType::Report, &options)?;
//! println!("{}", output.path.display());
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build a report with generated text
//! folio build report --project project_data.yaml
//!
//! # Build a synopsis without a text generator
//! folio build synopsis --offline --format json
//!
//! # Check the Ollama connection
//! folio check --model gemma3
//! ```

pub mod app;
pub mod builder;

pub use app::{
    build_command, check_command, print_build_summary, resolve_settings, run_cli, BuildOptions,
    DocTypeArg, GeneratorArgs, OutputFormat,
};
pub use builder::{BuildOutput, ReportBuilder};
