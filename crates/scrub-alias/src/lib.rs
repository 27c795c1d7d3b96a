//! # scrub-alias — Nickname Equivalence Store
//!
//! Remembers which first-name variants refer to which canonical first
//! names, and learns new ones from human-confirmed corrections.
//!
//! ## Architecture
//!
//! - **Log** (`log.rs`): append-only JSON-lines event log, hash-chained
//!   and verified on load. The single source of truth.
//! - **Store** (`store.rs`): the current alias state, a pure fold over
//!   the log's events.
//! - **Registry** (`registry.rs`): the single writer. Serializes
//!   mutations and publishes `Arc` snapshots for readers.
//! - **Correction** (`correction.rs`): validates reviewer corrections and
//!   plans their effect on the store.
//! - **Seed** (`seed.rs`): built-in English nickname table.
//!
//! ## Crate Policy
//!
//! - Depends on `scrub-core` only.
//! - Aliases are never deleted. Deprecation keeps the record.
//! - A rejected correction writes nothing.

pub mod alias;
pub mod correction;
pub mod error;
pub mod log;
pub mod registry;
pub mod seed;
pub mod store;

pub use alias::{AliasSource, AliasStatus, NicknameAlias};
pub use correction::{plan_correction, AliasEffect, CorrectionPlan, CorrectionRecord};
pub use error::AliasError;
pub use log::{verify_chain, AliasEvent, AliasLog, LogEntry};
pub use registry::AliasRegistry;
pub use seed::SEED_ALIASES;
pub use store::NicknameStore;
