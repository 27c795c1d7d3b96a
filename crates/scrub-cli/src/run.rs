//! # Run Subcommand
//!
//! Scrubs a batch of documents and writes the full report, the evaluator
//! views and the review queue.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use scrub_alias::AliasRegistry;
use scrub_core::EngineConfig;
use scrub_engine::{BatchProcessor, BatchReport, Orchestrator};
use scrub_match::EditDistanceSoundex;

use crate::input::{load_documents, load_roster, write_json};

/// Arguments for `scrub run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Roster snapshot (JSON).
    #[arg(long)]
    pub roster: PathBuf,

    /// Documents: a JSON file or a directory of `.txt` files.
    #[arg(long)]
    pub documents: PathBuf,

    /// Alias log. Without it, only the built-in nicknames are used.
    #[arg(long)]
    pub aliases: Option<PathBuf>,

    /// Extra word or phrase to redact from every document. Repeatable.
    #[arg(long = "custom-word")]
    pub custom_words: Vec<String>,

    /// Do not add the built-in nickname table to the alias log.
    #[arg(long)]
    pub no_seed: bool,

    /// Write the full batch report here.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write evaluator views here.
    #[arg(long)]
    pub evaluator_out: Option<PathBuf>,

    /// Write the review queue here.
    #[arg(long)]
    pub review_out: Option<PathBuf>,
}

/// Execute `scrub run`.
pub fn run_scrub(args: &RunArgs, config: &EngineConfig) -> Result<u8> {
    let report = scrub_batch(args, config)?;

    if let Some(path) = &args.out {
        write_json(path, &report)?;
    }
    if let Some(path) = &args.evaluator_out {
        write_json(path, &report.evaluator_views())?;
    }
    if let Some(path) = &args.review_out {
        write_json(path, &report.review_queue())?;
    }

    let stats = &report.stats;
    println!(
        "OK: scrubbed {} documents (confirmed {}, probable {}, unknown {})",
        stats.documents, stats.confirmed, stats.probable, stats.unknown
    );
    println!("  Needs review: {}", stats.needs_review);
    println!(
        "  Students matched: {} of {}",
        stats.matched_students,
        stats.matched_students + stats.unmatched_students.len()
    );
    for name in &stats.unmatched_students {
        println!("    unmatched: {name}");
    }
    Ok(0)
}

/// Load inputs and run the batch.
pub fn scrub_batch(args: &RunArgs, config: &EngineConfig) -> Result<BatchReport> {
    let roster = load_roster(&args.roster)?;
    let documents = load_documents(&args.documents)?;

    let registry = match &args.aliases {
        Some(path) => AliasRegistry::open(path, config.aliases.clone())
            .with_context(|| format!("failed to open alias log {}", path.display()))?,
        None => AliasRegistry::in_memory(config.aliases.clone()),
    };
    if !args.no_seed {
        registry.seed_defaults().context("failed to seed aliases")?;
    }
    let aliases = registry.snapshot();

    let strategy = EditDistanceSoundex;
    let orchestrator = Orchestrator::new(&roster, &aliases, config, &strategy)?
        .with_custom_words(args.custom_words.iter().cloned())?;
    let report = BatchProcessor::new(&orchestrator)
        .run(&documents)
        .context("batch failed")?;
    Ok(report)
}
