//! # scrub-core — Foundational Types for the Scrubbing Engine
//!
//! Every other crate in the workspace depends on `scrub-core`; it depends
//! on nothing internal.
//!
//! ## Contents
//!
//! - **Roster Index** (`roster.rs`): read-only lookups over the roster
//!   snapshot by normalized last name, first name, full name and student id.
//! - **Normalization** (`normalize.rs`): the single comparison form for
//!   names, plus word tokenization with byte spans.
//! - **Identifiers** (`identity.rs`): validated `StudentId`, `DocumentId`,
//!   and UUID-based `BatchId`.
//! - **Tiers** (`tier.rs`): `ConfidenceTier`, `DetectionMethod`,
//!   `ResolutionMethod`.
//! - **Configuration** (`config.rs`): every threshold, with defaults.
//! - **Errors** (`error.rs`): the structured error hierarchy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `scrub-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Names and document text are never logged.

pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod roster;
pub mod temporal;
pub mod tier;

pub use config::{AliasPolicy, DetectionConfig, EngineConfig, MatchingConfig, RedactionConfig};
pub use digest::{chain_digest, sha256_digest, ContentDigest};
pub use error::{ConfigError, CorrectionError, RosterError, ScrubError, ValidationError};
pub use identity::{BatchId, DocumentId, StudentId};
pub use normalize::{first_non_empty_line, normalize_name, split_full_name, word_tokens, Token};
pub use roster::{RosterEntry, RosterIndex, RosterRecord};
pub use temporal::Timestamp;
pub use tier::{ConfidenceTier, DetectionMethod, ResolutionMethod};
