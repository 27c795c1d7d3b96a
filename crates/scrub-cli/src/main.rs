//! # scrub CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scrub_cli::alias::{run_alias, AliasArgs};
use scrub_cli::correct::{run_correct, CorrectArgs};
use scrub_cli::load_config;
use scrub_cli::run::{run_scrub, RunArgs};

/// Student identity scrubbing engine.
///
/// Removes student names from documents before automated evaluation,
/// assigns each document to a roster student or a placeholder, and learns
/// nicknames from reviewer corrections.
#[derive(Parser, Debug)]
#[command(name = "scrub", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to the engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrub a batch of documents against a roster.
    Run(RunArgs),

    /// Record a reviewer correction.
    Correct(CorrectArgs),

    /// Inspect and maintain the nickname alias log.
    Alias(AliasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Run(args) => run_scrub(args, &config),
        Commands::Correct(args) => run_correct(args, &config),
        Commands::Alias(args) => run_alias(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
