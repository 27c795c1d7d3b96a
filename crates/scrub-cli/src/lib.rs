//! # scrub-cli — Command-Line Interface for the Scrubbing Engine
//!
//! Provides the `scrub` binary.
//!
//! ## Subcommands
//!
//! - `scrub run` — Scrub a batch of documents against a roster.
//! - `scrub correct` — Record a reviewer correction in the alias log.
//! - `scrub alias` — List, seed, deprecate and verify learned aliases.
//!
//! ```bash
//! scrub run --roster roster.json --documents essays/ --aliases aliases.jsonl --out report.json
//! scrub correct --roster roster.json --aliases aliases.jsonl \
//!     --document-id essay-07 --student-id S104 --as-written "Kaitlyn Bue"
//! scrub alias verify --aliases aliases.jsonl
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; scrubbing logic lives in the engine crates.
//! - Handlers return an exit code; errors carry `anyhow` context.

pub mod alias;
pub mod correct;
pub mod input;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use scrub_core::EngineConfig;

/// Load the engine configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrub.yaml");
        std::fs::write(&path, "redaction:\n  marker: \"[X]\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.redaction.marker, "[X]");
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrub.yaml");
        std::fs::write(&path, "matching:\n  tie_margin: 3.0\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }
}
