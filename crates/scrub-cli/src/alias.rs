//! # Alias Subcommand
//!
//! Operator access to the nickname alias log.
//!
//! - `list` — Show aliases, optionally for one canonical first name.
//! - `seed` — Append the built-in nickname table.
//! - `deprecate` — Flag an alias inactive. The record is kept.
//! - `verify` — Check the log's hash chain.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use scrub_alias::{AliasRegistry, AliasStatus, NicknameAlias};
use scrub_core::{normalize_name, EngineConfig};

/// Arguments for `scrub alias`.
#[derive(Args, Debug)]
pub struct AliasArgs {
    /// Alias log.
    #[arg(long, global = true, default_value = "aliases.jsonl")]
    pub aliases: PathBuf,

    #[command(subcommand)]
    pub command: AliasCommand,
}

/// Alias subcommands.
#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// List aliases.
    List {
        /// Only aliases of this canonical first name.
        #[arg(long)]
        canonical: Option<String>,
        /// Include deprecated aliases.
        #[arg(long)]
        all: bool,
    },

    /// Append the built-in nickname table entries the log lacks.
    Seed,

    /// Flag an alias inactive.
    Deprecate {
        /// Canonical first name.
        #[arg(long)]
        canonical: String,
        /// Alias token.
        #[arg(long)]
        alias: String,
        /// Why the alias is being retired.
        #[arg(long)]
        reason: String,
    },

    /// Verify the log's hash chain.
    Verify,
}

/// Execute `scrub alias`.
pub fn run_alias(args: &AliasArgs, config: &EngineConfig) -> Result<u8> {
    let registry = AliasRegistry::open(&args.aliases, config.aliases.clone())
        .with_context(|| format!("failed to open alias log {}", args.aliases.display()))?;

    match &args.command {
        AliasCommand::List { canonical, all } => {
            let store = registry.snapshot();
            let wanted = canonical.as_deref().map(normalize_name);
            let rows: Vec<&NicknameAlias> = store
                .iter()
                .filter(|a| wanted.as_ref().map_or(true, |w| a.canonical_key() == *w))
                .filter(|a| *all || a.is_active())
                .collect();
            if rows.is_empty() {
                println!("No aliases found.");
            }
            for alias in rows {
                println!("{}", format_alias(alias));
            }
            Ok(0)
        }
        AliasCommand::Seed => {
            let added = registry.seed_defaults()?;
            println!("OK: {added} seed aliases added");
            Ok(0)
        }
        AliasCommand::Deprecate {
            canonical,
            alias,
            reason,
        } => {
            registry.deprecate_alias(canonical, alias, reason)?;
            println!("OK: alias {alias} of {canonical} deprecated");
            Ok(0)
        }
        AliasCommand::Verify => {
            let entries = registry.verify()?;
            println!("OK: alias log chain intact ({entries} entries)");
            Ok(0)
        }
    }
}

/// One listing line.
pub fn format_alias(alias: &NicknameAlias) -> String {
    let status = match &alias.status {
        AliasStatus::Active => "active".to_string(),
        AliasStatus::Deprecated { reason, .. } => format!("deprecated: {reason}"),
    };
    format!(
        "{} -> {}  {} {:.2}  {} confirmation(s)  [{}]",
        alias.canonical_first,
        alias.alias_token,
        alias.source,
        alias.confidence,
        alias.confirmations.len(),
        status
    )
}
