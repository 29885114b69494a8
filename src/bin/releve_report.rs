// Relevé report CLI
//
// Purpose: Aggregate a vegetation-survey CSV and write its report
// Usage: releve_report <input.csv> [--no-ordination] [--format markdown]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use releve_report::{ReportConfig, ReportFormat, SurveyError, SurveyReporter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Aggregate a relevé survey CSV (RELEVE_ID, SPECIES_NAME, DOMIN) into a report
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Survey CSV file
    input: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report directory (default: reports/ beside the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Skip the external NMDS ordination
    #[arg(long)]
    no_ordination: bool,

    /// Skip malformed rows instead of aborting
    #[arg(long)]
    lenient: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ReportConfig::default(),
    }
    .with_env();

    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if cli.no_ordination {
        config.ordination.enabled = false;
    }
    if cli.lenient {
        config.strict = false;
    }

    Ok(config)
}

fn main() -> ExitCode {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "releve_report=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error [config]: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = SurveyReporter::new(config).and_then(|reporter| reporter.run(&cli.input));
    match result {
        Ok(summary) => {
            println!("{}", summary.report_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(e: &SurveyError) {
    eprintln!("error [{}]: {}", e.stage(), e);
    if let SurveyError::Ordination { diagnostics, .. } = e {
        if !diagnostics.is_empty() {
            eprintln!("--- ordination output ---\n{}", diagnostics);
        }
    }
}
