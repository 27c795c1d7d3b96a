//! # scrub-engine — Scrubbing Orchestrator
//!
//! Turns documents into redacted text plus an identity assignment.
//!
//! ## Contents
//!
//! - **Stages** (`stage.rs`): the per-document state machine and the trace
//!   each result carries.
//! - **Orchestrator** (`orchestrator.rs`): pattern detection, fuzzy
//!   corroboration, roster-prefix scan, fuzzy detection, then full
//!   redaction or placeholder fallback. Also correction supersession.
//! - **Redactor** (`redact.rs`): case-insensitive, word-bounded,
//!   whitespace-tolerant term replacement.
//! - **Placeholders** (`placeholder.rs`): batch-scoped `Unknown Student NN`.
//! - **Results** (`result.rs`): `ScrubResult` and its evaluator and
//!   review projections.
//! - **Batches** (`batch.rs`): parallel processing with cancellation and
//!   batch statistics.
//!
//! ## Crate Policy
//!
//! - The roster and nickname store are read-only here; corrections go
//!   through `scrub-alias`.
//! - Detection uncertainty is a tier or a warning, never an error.
//! - Names and document text are never logged.

pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod placeholder;
pub mod redact;
pub mod result;
pub mod stage;

pub use batch::{BatchProcessor, BatchReport, BatchStats};
pub use error::EngineError;
pub use orchestrator::{Analysis, Orchestrator, CORRECTION_CONFIDENCE};
pub use placeholder::{PlaceholderAllocator, PlaceholderIdentity};
pub use redact::{redact_spans, Redactor};
pub use result::{
    AssignedIdentity, Document, EvaluatorIdentity, EvaluatorView, ReviewItem, ScrubResult,
    ScrubWarning,
};
pub use stage::{ScrubStage, StageTrace};
