//! # Error Hierarchy
//!
//! Structured error types for the scrubbing engine, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Only structural violations raise: a malformed roster, an inconsistent
//! correction, a broken alias log, an invalid configuration. Detection-time
//! uncertainty never raises; it degrades the confidence tier of the result
//! instead.

use thiserror::Error;

/// Top-level error type for the scrubbing engine.
#[derive(Error, Debug)]
pub enum ScrubError {
    /// The roster snapshot is malformed.
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),

    /// A reviewer correction was rejected.
    #[error("correction rejected: {0}")]
    Correction(#[from] CorrectionError),

    /// Identifier or field validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Engine configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building the Roster Index.
///
/// All variants are fatal to batch construction and are surfaced to the
/// operator before any document is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Two roster records share the same student id.
    #[error("duplicate student id {student_id} (roster rows {first_row} and {second_row})")]
    DuplicateStudentId {
        /// The duplicated identifier.
        student_id: String,
        /// Zero-based row of the first occurrence.
        first_row: usize,
        /// Zero-based row of the second occurrence.
        second_row: usize,
    },

    /// A roster full name could not be split into first and last name.
    #[error("roster row {row}: cannot split {full_name:?} into first and last name")]
    UnparseableName {
        /// Zero-based roster row.
        row: usize,
        /// The offending full name.
        full_name: String,
    },

    /// A roster row carried an invalid identifier.
    #[error("roster row {row}: {source}")]
    InvalidId {
        /// Zero-based roster row.
        row: usize,
        /// Underlying validation failure.
        source: ValidationError,
    },
}

/// Errors raised by the Correction Feedback Recorder.
///
/// A rejected correction never mutates the alias store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    /// The as-written last name disagrees with the roster entry's last name.
    /// The engine only learns first-name aliases, never identity changes.
    #[error("as-written last name {as_written_last:?} does not match roster last name {canonical_last:?}")]
    InconsistentLastName {
        /// Last name as written on the document.
        as_written_last: String,
        /// Canonical last name from the roster.
        canonical_last: String,
    },

    /// The as-written name does not contain both a first and a last token.
    #[error("cannot split as-written name {0:?} into first and last name")]
    UnparseableName(String),

    /// The correction names a student that is not on the roster.
    #[error("student {0:?} is not on the roster")]
    UnknownStudent(String),
}

/// Errors during domain-primitive validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Student identifier is empty or whitespace.
    #[error("invalid student id: {0:?}")]
    InvalidStudentId(String),

    /// Document identifier is empty or whitespace.
    #[error("invalid document id: {0:?}")]
    InvalidDocumentId(String),

    /// Timestamp is not a UTC RFC 3339 string.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors in engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric setting lies outside its permitted range.
    #[error("{field} = {value} is outside the permitted range {min}..={max}")]
    OutOfRange {
        /// Dotted path of the setting.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A setting is semantically invalid.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted path of the setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration file is not valid YAML for `EngineConfig`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
