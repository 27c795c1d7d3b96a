//! # Alias Store Error Types
//!
//! Structured errors for the alias log, the store, and the correction
//! recorder. A rejected correction is wrapped unchanged so callers can
//! match on the underlying [`CorrectionError`].

use thiserror::Error;

use scrub_core::CorrectionError;

/// Errors from nickname store operations.
#[derive(Error, Debug)]
pub enum AliasError {
    /// A reviewer correction was rejected; nothing was mutated.
    #[error("correction rejected: {0}")]
    Rejected(#[from] CorrectionError),

    /// An operator action named an alias that does not exist.
    #[error("no alias {alias_token:?} recorded for {canonical_first:?}")]
    UnknownAlias {
        /// Canonical first name the alias was looked up under.
        canonical_first: String,
        /// The alias token.
        alias_token: String,
    },

    /// The alias log's hash chain does not verify.
    #[error("alias log chain broken at entry {seq}: {reason}")]
    ChainBroken {
        /// Sequence number of the first entry that fails verification.
        seq: u64,
        /// What failed.
        reason: String,
    },

    /// A log line could not be parsed.
    #[error("alias log line {line} is malformed: {source}")]
    Malformed {
        /// One-based line number in the log file.
        line: usize,
        /// Underlying parse failure.
        source: serde_json::Error,
    },

    /// Serialization of a new log entry failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error reading or appending the log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
