//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use folio_config::{Guidelines, ProjectData, Settings};
use folio_core::DocType;
use folio_generate::{ContentGenerator, OllamaClient, PlaceholderGenerator, TextGenerator};

use crate::builder::{BuildOutput, ReportBuilder};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Document type to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocTypeArg {
    Report,
    Synopsis,
}

impl From<DocTypeArg> for DocType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::Report => DocType::Report,
            DocTypeArg::Synopsis => DocType::Synopsis,
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Formatted academic reports from project data", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report or synopsis
    Build {
        /// Document type
        #[arg(value_enum)]
        doc_type: DocTypeArg,

        #[command(flatten)]
        options: BuildOptions,

        /// Output format for the build summary
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that the Ollama server answers and has the model
    Check {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Settings file (defaults to ./folio.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Generator overrides shared by `build` and `check`
#[derive(Debug, Clone, Default, Args)]
pub struct GeneratorArgs {
    /// Ollama model name
    #[arg(long)]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long)]
    pub ollama_url: Option<String>,
}

/// Inputs of a build; unset values come from the settings file
#[derive(Debug, Clone, Default, Args)]
pub struct BuildOptions {
    /// Project data file (YAML)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Directory the document is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Skip text generation and use placeholder text
    #[arg(long)]
    pub offline: bool,

    /// Settings file (defaults to ./folio.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            doc_type,
            options,
            format,
        } => {
            let output = build_command(doc_type.into(), &options)?;
            print_build_summary(&output, format)?;
        }
        Commands::Check { generator, config } => {
            check_command(&generator, config.as_deref())?;
        }
    }

    Ok(())
}

/// Install the log subscriber; `RUST_LOG` wins over the default level
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Settings from the file, with command-line overrides applied
pub fn resolve_settings(
    config: Option<&Path>,
    generator: &GeneratorArgs,
    output_dir: Option<&Path>,
    offline: bool,
) -> Result<Settings> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let mut settings = match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => Settings::discover(None, &cwd).context("Failed to load folio.toml")?,
    };

    if let Some(model) = &generator.model {
        settings.generator.model = model.clone();
    }
    if let Some(url) = &generator.ollama_url {
        settings.generator.url = url.clone();
    }
    if let Some(dir) = output_dir {
        settings.paths.output_dir = dir.to_path_buf();
    }
    if offline {
        settings.generator.enabled = false;
    }
    Ok(settings)
}

/// Execute the build command
pub fn build_command(doc_type: DocType, options: &BuildOptions) -> Result<BuildOutput> {
    let settings = resolve_settings(
        options.config.as_deref(),
        &options.generator,
        options.output_dir.as_deref(),
        options.offline,
    )?;

    let guidelines = match &settings.paths.guidelines {
        Some(path) => Guidelines::load(path)
            .with_context(|| format!("Failed to load guidelines: {}", path.display()))?,
        None => Guidelines::builtin(),
    };

    let project_path = options
        .project
        .clone()
        .unwrap_or_else(|| settings.paths.project_data.clone());
    if !project_path.exists() {
        anyhow::bail!("Project data file not found: {}", project_path.display());
    }
    let project = ProjectData::load(&project_path)
        .with_context(|| format!("Failed to load project data: {}", project_path.display()))?;

    let content = ContentGenerator::new(select_generator(&settings)?);
    let builder = ReportBuilder::new(&guidelines, content, &settings.paths.output_dir);
    builder
        .build(doc_type, &project)
        .with_context(|| format!("Failed to build {}", doc_type))
}

/// Ollama when enabled and reachable, placeholder text otherwise
fn select_generator(settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    if !settings.generator.enabled {
        tracing::info!("text generation disabled, using placeholder text");
        return Ok(Box::new(PlaceholderGenerator));
    }

    let client =
        OllamaClient::from_settings(&settings.generator).context("Failed to create Ollama client")?;
    match client.check_connection() {
        Ok(status) => {
            if !status.model_available {
                tracing::warn!(
                    model = client.model(),
                    "model not listed by the server; generation may fail"
                );
            }
            Ok(Box::new(client))
        }
        Err(e) => {
            tracing::warn!(
                url = client.base_url(),
                error = %e,
                "Ollama not reachable, using placeholder text"
            );
            Ok(Box::new(PlaceholderGenerator))
        }
    }
}

/// Print where the document went and what was degraded
pub fn print_build_summary(output: &BuildOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "path": output.path.display().to_string(),
                "doc_type": output.document.doc_type,
                "regions": output.document.regions.len(),
                "headings": output.document.headings.len(),
                "captions": output.document.captions.len(),
                "diagnostics": output.diagnostics,
            });
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize build summary to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for diag in &output.diagnostics {
                println!("{}", diag);
                println!();
            }
            println!("✓ Written: {}", output.path.display());
            println!(
                "  {} heading(s), {} caption(s), {} warning(s)",
                output.document.headings.len(),
                output.document.captions.len(),
                output.warning_count()
            );
        }
    }
    Ok(())
}

/// Execute the check command
pub fn check_command(generator: &GeneratorArgs, config: Option<&Path>) -> Result<()> {
    let settings = resolve_settings(config, generator, None, false)?;
    let client =
        OllamaClient::from_settings(&settings.generator).context("Failed to create Ollama client")?;

    let status = client
        .check_connection()
        .with_context(|| format!("Cannot reach Ollama at {}", client.base_url()))?;

    println!("✓ Ollama reachable at {}", client.base_url());
    if status.model_available {
        println!("✓ Model '{}' is available", client.model_tag());
    } else {
        println!("✗ Model '{}' is not installed", client.model_tag());
        if status.available_models.is_empty() {
            println!("  The server lists no models");
        } else {
            println!("  Available: {}", status.available_models.join(", "));
        }
        println!("  Install it with: ollama pull {}", client.model());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_arguments() {
        let cli = Cli::try_parse_from([
            "folio",
            "build",
            "synopsis",
            "--project",
            "data/project.yaml",
            "--offline",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Build {
                doc_type,
                options,
                format,
            } => {
                assert_eq!(doc_type, DocTypeArg::Synopsis);
                assert_eq!(options.project, Some(PathBuf::from("data/project.yaml")));
                assert!(options.offline);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_unknown_doc_type_is_rejected() {
        assert!(Cli::try_parse_from(["folio", "build", "thesis"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("folio.toml");
        std::fs::write(
            &config,
            "[generator]\nmodel = \"mistral\"\n\n[paths]\noutput_dir = \"reports\"\n",
        )
        .unwrap();

        let settings = resolve_settings(
            Some(&config),
            &GeneratorArgs {
                model: None,
                ollama_url: Some("http://10.0.0.5:11434".to_string()),
            },
            Some(Path::new("elsewhere")),
            true,
        )
        .unwrap();

        assert_eq!(settings.generator.model, "mistral");
        assert_eq!(settings.generator.url, "http://10.0.0.5:11434");
        assert_eq!(settings.paths.output_dir, PathBuf::from("elsewhere"));
        assert!(!settings.generator.enabled);
    }
}
