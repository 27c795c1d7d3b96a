//! # Alias Event Log
//!
//! Durable, append-only record of every change to the nickname store and
//! every accepted correction. One JSON object per line:
//!
//! ```text
//! {"seq":0,"recorded_at":"2026-03-02T14:00:00Z","event":{...},"prev_digest":"00..","digest":"9f.."}
//! ```
//!
//! ## Security Invariant
//!
//! Entries form a SHA-256 hash chain. `digest` links `prev_digest` with the
//! serialized `(seq, recorded_at, event)` triple, and the first entry links
//! to [`ContentDigest::GENESIS`]. [`AliasLog::open`] verifies the whole
//! chain, so an edited, reordered or truncated-in-the-middle log is refused
//! with [`AliasError::ChainBroken`] instead of silently loaded.
//!
//! The log is the source of truth; [`NicknameStore`](crate::NicknameStore)
//! is a fold over its events.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scrub_core::{chain_digest, ContentDigest, DocumentId, Timestamp};

use crate::correction::CorrectionRecord;
use crate::error::AliasError;

// ---------------------------------------------------------------------------
// AliasEvent
// ---------------------------------------------------------------------------

/// A state change recorded in the alias log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AliasEvent {
    /// A built-in nickname was added.
    AliasSeeded {
        /// Canonical first name.
        canonical_first: String,
        /// The nickname.
        alias_token: String,
        /// Initial confidence.
        confidence: f64,
    },
    /// A correction introduced a new first-name variant.
    AliasLearned {
        /// Canonical first name from the roster.
        canonical_first: String,
        /// The variant as written on the document.
        alias_token: String,
        /// Initial confidence.
        confidence: f64,
        /// The document whose correction taught the alias.
        document_id: DocumentId,
    },
    /// Another document confirmed an existing alias.
    ConfidenceRaised {
        /// Canonical first name.
        canonical_first: String,
        /// The alias token.
        alias_token: String,
        /// Confidence after the increase.
        confidence: f64,
        /// The confirming document.
        document_id: DocumentId,
    },
    /// An operator flagged an alias inactive.
    AliasDeprecated {
        /// Canonical first name.
        canonical_first: String,
        /// The alias token.
        alias_token: String,
        /// Operator-supplied reason.
        reason: String,
    },
    /// A reviewer correction was accepted.
    CorrectionRecorded {
        /// The full correction record.
        record: CorrectionRecord,
    },
}

impl AliasEvent {
    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AliasSeeded { .. } => "alias_seeded",
            Self::AliasLearned { .. } => "alias_learned",
            Self::ConfidenceRaised { .. } => "confidence_raised",
            Self::AliasDeprecated { .. } => "alias_deprecated",
            Self::CorrectionRecorded { .. } => "correction_recorded",
        }
    }
}

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

/// One line of the alias log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Zero-based position in the log.
    pub seq: u64,
    /// When the entry was appended.
    pub recorded_at: Timestamp,
    /// The recorded change.
    pub event: AliasEvent,
    /// Digest of the preceding entry ([`ContentDigest::GENESIS`] for the first).
    pub prev_digest: ContentDigest,
    /// Digest of this entry.
    pub digest: ContentDigest,
}

#[derive(Serialize)]
struct LinkedFields<'a> {
    seq: u64,
    recorded_at: &'a Timestamp,
    event: &'a AliasEvent,
}

impl LogEntry {
    fn seal(
        seq: u64,
        recorded_at: Timestamp,
        event: AliasEvent,
        prev_digest: ContentDigest,
    ) -> Result<Self, AliasError> {
        let digest = link(&prev_digest, seq, &recorded_at, &event)?;
        Ok(Self {
            seq,
            recorded_at,
            event,
            prev_digest,
            digest,
        })
    }

    /// Recompute this entry's digest from its fields.
    pub fn recompute_digest(&self) -> Result<ContentDigest, AliasError> {
        link(&self.prev_digest, self.seq, &self.recorded_at, &self.event)
    }
}

fn link(
    prev: &ContentDigest,
    seq: u64,
    recorded_at: &Timestamp,
    event: &AliasEvent,
) -> Result<ContentDigest, AliasError> {
    let bytes = serde_json::to_vec(&LinkedFields {
        seq,
        recorded_at,
        event,
    })?;
    Ok(chain_digest(prev, &bytes))
}

/// Check that `entries` form an unbroken chain starting at genesis.
///
/// # Errors
///
/// Returns [`AliasError::ChainBroken`] at the first entry whose sequence
/// number, back link or digest does not verify.
pub fn verify_chain(entries: &[LogEntry]) -> Result<(), AliasError> {
    let mut expected_prev = ContentDigest::GENESIS;
    for (pos, entry) in entries.iter().enumerate() {
        let pos = pos as u64;
        if entry.seq != pos {
            return Err(AliasError::ChainBroken {
                seq: pos,
                reason: format!("expected sequence number {pos}, found {}", entry.seq),
            });
        }
        if entry.prev_digest != expected_prev {
            return Err(AliasError::ChainBroken {
                seq: pos,
                reason: "back link does not match the preceding entry".to_string(),
            });
        }
        if entry.recompute_digest()? != entry.digest {
            return Err(AliasError::ChainBroken {
                seq: pos,
                reason: "digest does not match entry contents".to_string(),
            });
        }
        expected_prev = entry.digest;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// AliasLog
// ---------------------------------------------------------------------------

/// The alias log, optionally backed by a JSON-lines file.
///
/// ## Thread Safety
///
/// Not internally synchronized; [`AliasRegistry`](crate::AliasRegistry)
/// owns the log behind a mutex and is the only writer.
#[derive(Debug, Default)]
pub struct AliasLog {
    path: Option<PathBuf>,
    entries: Vec<LogEntry>,
}

impl AliasLog {
    /// A log that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed log, loading and verifying existing entries.
    /// A missing file is an empty log; the file is created on first append.
    ///
    /// # Errors
    ///
    /// [`AliasError::Malformed`] for an unparseable line,
    /// [`AliasError::ChainBroken`] if verification fails, or
    /// [`AliasError::Io`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AliasError> {
        let path = path.into();
        let entries = if path.exists() {
            read_entries(&path)?
        } else {
            Vec::new()
        };
        verify_chain(&entries)?;
        tracing::debug!(entries = entries.len(), "alias log loaded");
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Append events in order, stamped with the current time.
    ///
    /// The new lines are written and synced before the in-memory entries
    /// change. A failed write truncates the file back to its previous
    /// length, so neither the file nor the in-memory log changes.
    pub fn append(&mut self, events: Vec<AliasEvent>) -> Result<&[LogEntry], AliasError> {
        self.append_at(events, Timestamp::now())
    }

    /// Append events with an explicit timestamp.
    pub fn append_at(
        &mut self,
        events: Vec<AliasEvent>,
        recorded_at: Timestamp,
    ) -> Result<&[LogEntry], AliasError> {
        let start = self.entries.len();
        let mut prev = self.head();
        let mut sealed = Vec::with_capacity(events.len());
        for (offset, event) in events.into_iter().enumerate() {
            let entry = LogEntry::seal((start + offset) as u64, recorded_at, event, prev)?;
            prev = entry.digest;
            sealed.push(entry);
        }

        if let Some(path) = &self.path {
            let mut buf = Vec::new();
            for entry in &sealed {
                serde_json::to_writer(&mut buf, entry)?;
                buf.push(b'\n');
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            let committed_len = file.metadata()?.len();
            write_or_truncate(&mut file, committed_len, |f| {
                f.write_all(&buf)?;
                f.sync_data()
            })?;
        }

        for entry in &sealed {
            tracing::debug!(seq = entry.seq, event = entry.event.kind(), "alias log entry appended");
        }
        self.entries.extend(sealed);
        Ok(&self.entries[start..])
    }

    /// All entries in order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest of the last entry, or genesis for an empty log.
    pub fn head(&self) -> ContentDigest {
        self.entries
            .last()
            .map(|e| e.digest)
            .unwrap_or(ContentDigest::GENESIS)
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-verify the in-memory chain.
    pub fn verify(&self) -> Result<(), AliasError> {
        verify_chain(&self.entries)
    }
}

/// Run `write` against `file`; on failure, cut the file back to
/// `committed_len` so no torn line survives.
fn write_or_truncate(
    file: &mut File,
    committed_len: u64,
    write: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let Err(err) = write(file) else {
        return Ok(());
    };
    if let Err(rollback) = file.set_len(committed_len) {
        tracing::error!(error = %rollback, "alias log rollback failed");
    }
    Err(err)
}

fn read_entries(path: &Path) -> Result<Vec<LogEntry>, AliasError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|source| AliasError::Malformed {
            line: idx + 1,
            source,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
