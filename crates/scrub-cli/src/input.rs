//! # Input and Output Files
//!
//! - Roster: JSON array of `{ "full_name": ..., "student_id": ... }`.
//! - Documents: JSON array of `{ "document_id": ..., "text": ... }`, or a
//!   directory of `.txt` files whose stems become document ids.
//! - Outputs are pretty-printed JSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use scrub_core::{DocumentId, RosterIndex, RosterRecord};
use scrub_engine::Document;

/// Read and index a roster snapshot.
pub fn load_roster(path: &Path) -> Result<RosterIndex> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    let records: Vec<RosterRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse roster {}", path.display()))?;
    let roster = RosterIndex::from_records(&records).context("invalid roster")?;
    tracing::info!(students = roster.len(), "roster loaded");
    Ok(roster)
}

/// Read documents from a JSON file or a directory of `.txt` files.
/// Directory entries are sorted by file name so batches are reproducible.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let documents = if path.is_dir() {
        load_text_dir(path)?
    } else {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read documents {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse documents {}", path.display()))?
    };
    tracing::info!(documents = documents.len(), "documents loaded");
    Ok(documents)
}

fn load_text_dir(dir: &Path) -> Result<Vec<Document>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            bail!("document file name is not valid UTF-8: {}", path.display());
        };
        let document_id = DocumentId::new(stem)
            .with_context(|| format!("invalid document id from {}", path.display()))?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(Document::new(document_id, text));
    }
    Ok(documents)
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
