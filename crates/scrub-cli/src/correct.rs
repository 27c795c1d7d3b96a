//! # Correct Subcommand
//!
//! Records a reviewer correction: "document D was written by roster
//! student S, who wrote their name as N". Valid corrections are appended
//! to the alias log and may teach a new nickname.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use scrub_alias::{AliasEffect, AliasRegistry};
use scrub_core::{CorrectionError, DocumentId, EngineConfig, RosterEntry, RosterIndex};

use crate::input::load_roster;

/// Arguments for `scrub correct`.
#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// Roster snapshot (JSON).
    #[arg(long)]
    pub roster: PathBuf,

    /// Alias log to append to.
    #[arg(long)]
    pub aliases: PathBuf,

    /// The corrected document.
    #[arg(long)]
    pub document_id: String,

    /// Roster student id of the author.
    #[arg(long, conflicts_with = "student", required_unless_present = "student")]
    pub student_id: Option<String>,

    /// Roster full name of the author, when ids are not used.
    #[arg(long)]
    pub student: Option<String>,

    /// The name exactly as written on the document.
    #[arg(long)]
    pub as_written: String,
}

/// Execute `scrub correct`.
pub fn run_correct(args: &CorrectArgs, config: &EngineConfig) -> Result<u8> {
    let roster = load_roster(&args.roster)?;
    let entry = find_student(&roster, args.student_id.as_deref(), args.student.as_deref())?;
    let document_id = DocumentId::new(args.document_id.as_str()).context("invalid document id")?;

    let registry = AliasRegistry::open(&args.aliases, config.aliases.clone())
        .with_context(|| format!("failed to open alias log {}", args.aliases.display()))?;
    let record = registry
        .record_correction(&document_id, entry, &args.as_written)
        .context("correction rejected")?;

    println!(
        "OK: {} attributed to {}",
        record.document_id, record.roster_entry.canonical_full_name
    );
    match &record.alias_effect {
        AliasEffect::NoAlias => println!("  No alias needed"),
        AliasEffect::Learned {
            alias_token,
            confidence,
        } => println!(
            "  Learned alias {alias_token} -> {} ({confidence:.2})",
            entry.canonical_first
        ),
        AliasEffect::ConfidenceRaised {
            alias_token,
            from,
            to,
        } => println!("  Alias {alias_token} confidence {from:.2} -> {to:.2}"),
        AliasEffect::AlreadyConfirmed { alias_token } => {
            println!("  Alias {alias_token} already confirmed by this document")
        }
        AliasEffect::Deprecated { alias_token } => {
            println!("  Alias {alias_token} is deprecated and was not revived")
        }
    }
    Ok(0)
}

/// Resolve the corrected student by id or by full name.
pub fn find_student<'r>(
    roster: &'r RosterIndex,
    student_id: Option<&str>,
    full_name: Option<&str>,
) -> Result<&'r RosterEntry> {
    if let Some(id) = student_id {
        return roster
            .lookup_id(id)
            .ok_or_else(|| CorrectionError::UnknownStudent(id.to_string()).into());
    }
    let Some(name) = full_name else {
        bail!("either --student-id or --student is required");
    };
    match roster.lookup_full(name).as_slice() {
        [entry] => Ok(*entry),
        [] => Err(CorrectionError::UnknownStudent(name.to_string()).into()),
        many => bail!(
            "{} roster students are named {name:?}; use --student-id",
            many.len()
        ),
    }
}
