//! # Scrub Results and Views
//!
//! [`ScrubResult`] is the full internal record for one document. It is
//! created once and never mutated; a correction produces a new result that
//! supersedes it.
//!
//! Two projections leave the engine:
//!
//! - [`EvaluatorView`] for the automated evaluator: redacted text plus a
//!   student id or placeholder label. Never the raw first line.
//! - [`ReviewItem`] for human reviewers: everything not `confirmed`.

use serde::{Deserialize, Serialize};

use scrub_core::{ConfidenceTier, DocumentId, ResolutionMethod, RosterEntry, StudentId};

use crate::placeholder::PlaceholderIdentity;
use crate::stage::ScrubStage;

/// One input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-assigned identifier.
    pub document_id: DocumentId,
    /// Full document text.
    pub text: String,
}

impl Document {
    /// Convenience constructor.
    pub fn new(document_id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            document_id,
            text: text.into(),
        }
    }
}

/// Who a document was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignedIdentity {
    /// A roster student.
    Student {
        /// The roster entry.
        entry: RosterEntry,
    },
    /// No student could be resolved.
    Placeholder {
        /// The placeholder.
        placeholder: PlaceholderIdentity,
    },
}

impl AssignedIdentity {
    /// The roster entry, for a resolved identity.
    pub fn entry(&self) -> Option<&RosterEntry> {
        match self {
            Self::Student { entry } => Some(entry),
            Self::Placeholder { .. } => None,
        }
    }

    /// The placeholder, for an unresolved identity.
    pub fn placeholder(&self) -> Option<&PlaceholderIdentity> {
        match self {
            Self::Student { .. } => None,
            Self::Placeholder { placeholder } => Some(placeholder),
        }
    }
}

/// Something a reviewer should know about a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ScrubWarning {
    /// The document has no text.
    EmptyDocument,
    /// Several roster entries matched equally well.
    AmbiguousMatch {
        /// Entries within the tie margin of the best, the best included.
        contenders: usize,
        /// Best confidence seen.
        best_confidence: f64,
    },
    /// A probable pattern candidate was not confirmed by fuzzy matching.
    CorroborationFailed,
}

/// The full record of scrubbing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubResult {
    /// The document.
    pub document_id: DocumentId,
    /// Student or placeholder.
    pub assigned_identity: AssignedIdentity,
    /// Confirmed, probable or unknown.
    pub confidence_tier: ConfidenceTier,
    /// Confidence of the resolution; zero for unknown.
    pub confidence: f64,
    /// The document with identity tokens replaced.
    pub redacted_text: String,
    /// First non-empty line as written. Only kept for unknown results.
    pub raw_first_line: Option<String>,
    /// How the identity was assigned.
    pub method_used: ResolutionMethod,
    /// Reviewer-facing warnings.
    pub warnings: Vec<ScrubWarning>,
    /// Stages the document passed through.
    pub stages: Vec<ScrubStage>,
}

impl ScrubResult {
    /// Whether a reviewer should look at this result.
    pub fn needs_review(&self) -> bool {
        self.confidence_tier.needs_review()
    }

    /// Projection for the automated evaluator.
    pub fn evaluator_view(&self) -> EvaluatorView {
        let identity = match &self.assigned_identity {
            AssignedIdentity::Student { entry } => EvaluatorIdentity::Student {
                student_id: entry.student_id.clone(),
            },
            AssignedIdentity::Placeholder { placeholder } => EvaluatorIdentity::Placeholder {
                label: placeholder.label.clone(),
            },
        };
        EvaluatorView {
            document_id: self.document_id.clone(),
            identity,
            redacted_text: self.redacted_text.clone(),
        }
    }

    /// Projection for human review; `None` for confirmed results.
    pub fn review_item(&self) -> Option<ReviewItem> {
        if !self.needs_review() {
            return None;
        }
        Some(ReviewItem {
            document_id: self.document_id.clone(),
            confidence_tier: self.confidence_tier,
            confidence: self.confidence,
            method_used: self.method_used,
            raw_first_line: self.raw_first_line.clone(),
            proposed_identity: self.assigned_identity.entry().cloned(),
            placeholder_label: self
                .assigned_identity
                .placeholder()
                .map(|p| p.label.clone()),
            preview: preview(&self.redacted_text, PREVIEW_LINES),
            warnings: self.warnings.clone(),
        })
    }
}

/// What the evaluator is told about authorship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluatorIdentity {
    /// A roster student, by id only.
    Student {
        /// The roster's student id, if it has one.
        student_id: Option<StudentId>,
    },
    /// An unresolved document.
    Placeholder {
        /// Placeholder label.
        label: String,
    },
}

/// The only view of a document handed to the automated evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorView {
    /// The document.
    pub document_id: DocumentId,
    /// Student id or placeholder.
    pub identity: EvaluatorIdentity,
    /// Redacted document text.
    pub redacted_text: String,
}

/// A result that needs a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// The document.
    pub document_id: DocumentId,
    /// Probable or unknown.
    pub confidence_tier: ConfidenceTier,
    /// Confidence of the resolution.
    pub confidence: f64,
    /// How the identity was assigned.
    pub method_used: ResolutionMethod,
    /// Raw first line, for unknown results.
    pub raw_first_line: Option<String>,
    /// The engine's best guess, for probable results.
    pub proposed_identity: Option<RosterEntry>,
    /// Placeholder label, for unknown results.
    pub placeholder_label: Option<String>,
    /// First non-empty lines of the redacted text.
    pub preview: String,
    /// Warnings from detection.
    pub warnings: Vec<ScrubWarning>,
}

const PREVIEW_LINES: usize = 3;

/// The first `lines` non-empty lines of `text`, joined with newlines.
pub fn preview(text: &str, lines: usize) -> String {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .take(lines)
        .collect::<Vec<_>>()
        .join("\n")
}
