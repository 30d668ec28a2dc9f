use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{LogLevel, load_config};
use report::{ReportAssembler, ResearchReport, render_html};
use std::fs;
use std::path::{Path, PathBuf};

mod console;
mod telemetry;

/// The main entry point for the liquidity research application.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only supplies optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Logging depends on configuration, so the config is loaded first.
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _guard = telemetry::init_tracing(&config.logging);

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config),
        Commands::Validate(args) => handle_validate(args),
        Commands::ExportHtml(args) => handle_export_html(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Scores African liquidity markets on sourcing and efficiency, offchain and onchain.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level. `RUST_LOG` still takes precedence.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and produce a research report.
    Analyze(AnalyzeArgs),
    /// Check an input file for missing or inconsistent fields.
    Validate(ValidateArgs),
    /// Render a previously saved JSON report as HTML.
    ExportHtml(ExportHtmlArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Market data file (.json or .csv).
    #[arg(long)]
    input: PathBuf,

    /// Where to write the JSON report.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the HTML report.
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Market data file (.json or .csv).
    #[arg(long)]
    input: PathBuf,
}

#[derive(Parser)]
struct ExportHtmlArgs {
    /// A JSON report written by `analyze --output`.
    #[arg(long)]
    report: PathBuf,

    /// Where to write the HTML page.
    #[arg(long)]
    output: PathBuf,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

/// Loads, normalizes and analyzes the input, then prints and saves the report.
fn handle_analyze(args: AnalyzeArgs, config: configuration::Config) -> anyhow::Result<()> {
    tracing::info!(input = %args.input.display(), "Starting analysis.");

    // 1. Load the raw records.
    let raw = ingest::load_path(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    // 2. Validate and normalize. Warnings are advisory and already logged.
    let normalized = ingest::check(&raw).context("Input failed validation")?;
    let warnings = &normalized.warnings;

    // 3. Run every analyzer.
    let report = ReportAssembler::new(config)
        .with_data_structure(normalized.shape.describe())
        .assemble(&normalized.providers);

    // 4. Present and persist.
    console::print_report_summary(&report);
    if !warnings.is_empty() {
        console::print_warnings(warnings);
    }
    if let Some(path) = &args.output {
        report
            .save_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("JSON report written to {}", path.display());
    }
    if let Some(path) = &args.html {
        write_html(&report, path)?;
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let raw = ingest::load_path(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let normalized = ingest::check(&raw).context("Input failed validation")?;

    println!(
        "{}: {} provider(s), {}",
        args.input.display(),
        normalized.providers.len(),
        normalized.shape.describe()
    );
    console::print_warnings(&normalized.warnings);
    Ok(())
}

fn handle_export_html(args: ExportHtmlArgs) -> anyhow::Result<()> {
    let report = ResearchReport::load_json(&args.report)
        .with_context(|| format!("Failed to read report {}", args.report.display()))?;
    write_html(&report, &args.output)
}

fn write_html(report: &ResearchReport, path: &Path) -> anyhow::Result<()> {
    fs::write(path, render_html(report))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "HTML report written.");
    println!("HTML report written to {}", path.display());
    Ok(())
}
