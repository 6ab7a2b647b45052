//! Command-line interface components.
//!
//! Argument parsing, logging setup, layered configuration loading and the
//! human-readable run summary.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::processor::{Pipeline, StageOutcome};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Normalize DPV-CQW JSON exports and build dashboard chart payloads
#[derive(Debug, Clone, Parser)]
#[command(name = "dpv-cqw")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Normalize meteorological and air-quality JSON exports into chart-ready payloads"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the raw JSON exports
    #[arg(long, value_name = "PATH", global = true)]
    pub raw_dir: Option<PathBuf>,

    /// Output directory for cleaned datasets
    #[arg(long, value_name = "PATH", global = true)]
    pub cleaned_dir: Option<PathBuf>,

    /// Output directory for chart payloads
    #[arg(long, value_name = "PATH", global = true)]
    pub processed_dir: Option<PathBuf>,

    /// JSON config file (defaults to the user config directory when present)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show errors; also hides progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Normalize raw exports into cleaned datasets
    Preprocess,
    /// Build chart payloads from the cleaned datasets
    Charts,
    /// Preprocess, then build charts (default)
    Run,
}

impl Args {
    /// Selected stage; no subcommand means a full run
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the level derived from `-v`/`-q`.
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dpv_cqw={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| PipelineError::configuration(format!("Logging setup failed: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (file -> env -> args)
pub fn load_configuration(args: &Args) -> Result<PipelineConfig> {
    let default_config_path = match &args.config_file {
        Some(_) => None,
        None => PipelineConfig::default_config_path().ok(),
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    let mut config = PipelineConfig::load_layered(config_file, |name| std::env::var(name).ok())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

/// Apply command-line overrides on top of file and environment settings
pub fn apply_cli_overrides(config: &mut PipelineConfig, args: &Args) {
    if let Some(dir) = &args.raw_dir {
        config.raw_dir = dir.clone();
    }
    if let Some(dir) = &args.cleaned_dir {
        config.cleaned_dir = dir.clone();
    }
    if let Some(dir) = &args.processed_dir {
        config.processed_dir = dir.clone();
    }
    if args.quiet {
        config.show_progress = false;
    }
}

/// Entry point shared by the binary: logging, config, then the chosen stage
pub fn run(args: &Args) -> Result<()> {
    setup_logging(args)?;
    let config = load_configuration(args)?;
    let quiet = args.quiet;
    let pipeline = Pipeline::new(config);

    match args.command() {
        Command::Preprocess => {
            let outcome = pipeline.preprocess()?;
            print_summary("Preprocessing complete", &outcome, quiet);
        }
        Command::Charts => {
            let outcome = pipeline.build_charts()?;
            print_summary("Chart processing complete", &outcome, quiet);
        }
        Command::Run => {
            let outcome = pipeline.run()?;
            print_summary("Preprocessing complete", &outcome.preprocessing, quiet);
            print_summary("Chart processing complete", &outcome.processing, quiet);
        }
    }
    Ok(())
}

/// Print the per-dataset row counts and output paths of one stage
pub fn print_summary(title: &str, outcome: &StageOutcome, quiet: bool) {
    if quiet {
        return;
    }

    println!("\n{}", title.bright_green().bold());
    for report in &outcome.datasets {
        println!(
            "  {} {} {} {} {}",
            report.dataset.bright_cyan(),
            "rows in".bright_black(),
            report.rows_in.to_string().bright_white().bold(),
            "rows out".bright_black(),
            report.rows_out.to_string().bright_white().bold()
        );
        println!("    {} {}", "JSON:".bright_black(), report.json_path);
    }
    println!(
        "  {} {}",
        "Report:".bright_yellow(),
        outcome.report_path.display()
    );
}
