//! # scrub-match — Identity Detectors
//!
//! The three detectors the orchestrator chains, strongest signal first.
//!
//! - **Pattern** (`pattern.rs`): labeled `Name:` / `Student ID:` fields and
//!   MLA-style headers in the header window.
//! - **Prefix** (`prefix.rs`): a roster full name at the start of a
//!   header line.
//! - **Fuzzy** (`fuzzy.rs`): nickname, misspelling and reordering
//!   tolerant matching of header tokens against the roster.
//! - **Similarity** (`similarity.rs`): the pluggable metric behind fuzzy
//!   matching.
//!
//! ## Crate Policy
//!
//! - Detectors are pure functions of the document, the roster and an alias
//!   snapshot. None of them mutates shared state.
//! - Detection uncertainty is expressed as confidence, never as an error.
//! - Names and document text are never logged.

pub mod candidate;
pub mod fuzzy;
pub mod pattern;
pub mod prefix;
pub mod similarity;

pub use candidate::{DetectionCandidate, HeaderToken, TokenSpan};
pub use fuzzy::{header_tokens, FuzzyMatcher, FuzzyOutcome};
pub use pattern::{is_label_word, labeled_fields, LabelKind, LabeledField, PatternDetection, PatternDetector};
pub use prefix::PrefixScanner;
pub use similarity::{levenshtein, levenshtein_ratio, soundex, EditDistanceSoundex, SimilarityStrategy};
