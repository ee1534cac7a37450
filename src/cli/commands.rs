//! CLI command definitions for case-forge.
//!
//! This module provides the command-line interface for growing a
//! training-case dataset with a local model, checking a dataset against the
//! structural rules, and previewing the generation prompt.

use crate::cases::{CaseValidator, PromptBuilder, DEFAULT_ORGANIZATION};
use crate::pipeline::{SynthesisConfig, SynthesisRunner, TabularFormat, TracingObserver};
use crate::storage::RecordStore;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Default dataset read by `validate` and `prompt`.
const DEFAULT_INPUT: &str = "cases.csv";

/// LLM-backed training-case synthesizer.
#[derive(Parser)]
#[command(name = "case-forge")]
#[command(about = "Grow a training-case dataset with a local LLM")]
#[command(version)]
#[command(
    long_about = "case-forge reads training cases from a CSV file, asks an OpenAI-compatible model to write new cases in the same format, validates them and appends them to the dataset.\n\nIf the model cannot be used, template cases are generated instead.\n\nExample usage:\n  case-forge synthesize --input cases.csv --output generated_cases.csv --count 10"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate new cases and save them with the originals.
    #[command(alias = "gen")]
    Synthesize(SynthesizeArgs),

    /// Check every row of a dataset against the case rules.
    Validate(ValidateArgs),

    /// Print the generation prompt built from a dataset's first row.
    Prompt(PromptArgs),
}

/// Arguments for `case-forge synthesize`.
///
/// Flags override values from `--config`, which override the defaults.
#[derive(Parser, Debug)]
pub struct SynthesizeArgs {
    /// Input dataset; its first row is the example case.
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Output dataset (originals followed by new cases).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Number of new cases to generate.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// YAML configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "CASE_FORGE_API_BASE")]
    pub api_base: Option<String>,

    /// API key sent as a bearer token.
    #[arg(long, env = "CASE_FORGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to generate with.
    #[arg(short = 'm', long, env = "CASE_FORGE_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0).
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Skip the model and generate template cases only.
    #[arg(long)]
    pub template_only: bool,

    /// Case identifier prefix (e.g. X5).
    #[arg(long)]
    pub prefix: Option<String>,

    /// Field delimiter of the dataset files.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Do not check that the backend is reachable before generating.
    #[arg(long)]
    pub no_probe: bool,

    /// Output the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `case-forge validate`.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Dataset to check.
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Case identifier prefix (e.g. X5).
    #[arg(long, default_value = crate::cases::DEFAULT_ID_PREFIX)]
    pub prefix: String,

    /// Minimum scenario/solution length in characters.
    #[arg(long, default_value_t = crate::cases::DEFAULT_MIN_TEXT_CHARS)]
    pub min_chars: usize,

    /// Field delimiter of the dataset file.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Output results as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `case-forge prompt`.
#[derive(Parser, Debug)]
pub struct PromptArgs {
    /// Dataset whose first row is the example case.
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Case identifier prefix (e.g. X5).
    #[arg(long, default_value = crate::cases::DEFAULT_ID_PREFIX)]
    pub prefix: String,

    /// Organization named in the prompt.
    #[arg(long, default_value = DEFAULT_ORGANIZATION)]
    pub organization: String,

    /// Field delimiter of the dataset file.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the case-forge CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Synthesize(args) => run_synthesize_command(args).await,
        Commands::Validate(args) => run_validate_command(args),
        Commands::Prompt(args) => run_prompt_command(args),
    }
}

// ============================================================================
// Synthesize
// ============================================================================

/// Merge the configuration file and command-line flags.
pub fn build_config(args: &SynthesizeArgs) -> anyhow::Result<SynthesisConfig> {
    let mut config = match args.config {
        Some(ref path) => SynthesisConfig::from_yaml_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration '{}': {}", path.display(), e)
        })?,
        None => SynthesisConfig::default(),
    };

    if let Some(ref input) = args.input {
        config.input = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(ref api_base) = args.api_base {
        config.backend.api_base = api_base.clone();
    }
    if let Some(ref api_key) = args.api_key {
        config.backend.api_key = Some(api_key.clone());
    }
    if let Some(ref model) = args.model {
        config.backend.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.backend.temperature = temperature;
    }
    if let Some(ref prefix) = args.prefix {
        config.id_prefix = prefix.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.format.delimiter = delimiter;
    }
    if args.template_only {
        config.template_only = true;
    }
    if args.no_probe {
        config.probe_backend = false;
    }

    Ok(config)
}

async fn run_synthesize_command(args: SynthesizeArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        count = config.count,
        model = %config.backend.model,
        template_only = config.template_only,
        "Starting synthesis run"
    );

    let runner = SynthesisRunner::new(config)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?
        .with_observer(Arc::new(TracingObserver));

    let summary = runner.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if let Some(ref reason) = summary.fallback_reason {
        eprintln!("Model generation failed: {}", reason);
        eprintln!("Fell back to template cases.");
    }

    println!("✓ Synthesis completed");
    println!("  Total rows:     {}", summary.total_rows);
    println!("  Original rows:  {}", summary.original_rows);
    println!("  New cases:      {} of {} requested", summary.generated, summary.requested);
    println!("  Mode:           {}", summary.mode);
    if let Some(ref model) = summary.model {
        println!("  Model:          {}", model);
    }
    if !summary.skipped.is_empty() {
        println!("  Skipped:        {:?}", summary.skipped);
    }
    println!("  Output:         {}", summary.output.display());
    println!("  Duration:       {:.1}s", summary.duration_ms as f64 / 1000.0);

    Ok(())
}

// ============================================================================
// Validate
// ============================================================================

/// Validation outcome of one dataset row.
#[derive(Debug, Serialize)]
struct RowReport {
    row: usize,
    case_id: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_dataset(path: &Path, delimiter: char) -> anyhow::Result<crate::cases::Dataset> {
    let store = store_for(delimiter)?;
    store
        .load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load dataset: {}", e))
}

fn store_for(delimiter: char) -> anyhow::Result<RecordStore> {
    TabularFormat {
        delimiter,
        ..TabularFormat::default()
    }
    .store()
    .map_err(|e| anyhow::anyhow!("{}", e))
}

fn run_validate_command(args: ValidateArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.input, args.delimiter)?;
    let validator = CaseValidator::new(args.prefix, args.min_chars);

    let reports: Vec<RowReport> = dataset
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let result = validator.validate_record(record);
            RowReport {
                row,
                case_id: record.case_id.clone(),
                valid: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect();
    let valid = reports.iter().filter(|r| r.valid).count();

    if args.json {
        let output = serde_json::json!({
            "input": args.input,
            "total": reports.len(),
            "valid": valid,
            "invalid": reports.len() - valid,
            "rows": reports,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for report in &reports {
        match report.error {
            None => println!("  ✓ [{}] {}", report.row, report.case_id),
            Some(ref error) => println!("  ✗ [{}] {}: {}", report.row, report.case_id, error),
        }
    }
    println!();
    println!(
        "{} of {} rows valid ({})",
        valid,
        reports.len(),
        args.input.display()
    );

    Ok(())
}

// ============================================================================
// Prompt
// ============================================================================

fn run_prompt_command(args: PromptArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.input, args.delimiter)?;
    let exemplar = dataset.exemplar().ok_or_else(|| {
        anyhow::anyhow!("Dataset '{}' has no rows", args.input.display())
    })?;

    let prompt = PromptBuilder::new(args.organization, args.prefix).build(exemplar);
    println!("{}", prompt);
    Ok(())
}
