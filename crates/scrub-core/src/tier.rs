//! # Confidence Tiers and Detection Methods
//!
//! A resolution's tier governs what happens downstream: `confirmed` and
//! `probable` identities are redacted throughout the document, `unknown`
//! falls back to a placeholder. Anything short of `confirmed` is flagged
//! for human review.

use serde::{Deserialize, Serialize};

/// How much the engine trusts an identity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// No identity could be resolved without guessing.
    Unknown,
    /// Resolved, but below the confirmation threshold.
    Probable,
    /// Resolved to exactly one roster entry with high confidence.
    Confirmed,
}

impl ConfidenceTier {
    /// Tier for a resolved candidate with the given confidence.
    pub fn for_confidence(confidence: f64, confirm_threshold: f64) -> Self {
        if confidence >= confirm_threshold {
            Self::Confirmed
        } else {
            Self::Probable
        }
    }

    /// Whether the identity was resolved (and therefore redacted).
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Probable)
    }

    /// Whether a human reviewer should look at this result.
    pub fn needs_review(&self) -> bool {
        !matches!(self, Self::Confirmed)
    }

    /// The canonical string name of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Probable => "probable",
            Self::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which detector produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Labeled field or MLA-style header in the header window.
    Pattern,
    /// A roster full name found at the start of a header line.
    RosterPrefix,
    /// Roster-informed fuzzy and nickname matching.
    Fuzzy,
}

impl DetectionMethod {
    /// The canonical string name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::RosterPrefix => "roster_prefix",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the identity in a scrub result was finally assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Resolved by the pattern detector.
    Pattern,
    /// Resolved by the roster-prefix scanner.
    RosterPrefix,
    /// Resolved by the fuzzy matcher.
    Fuzzy,
    /// Assigned by a human-confirmed correction.
    Correction,
    /// Nothing resolved; a placeholder identity was assigned.
    Fallback,
}

impl ResolutionMethod {
    /// The canonical string name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::RosterPrefix => "roster_prefix",
            Self::Fuzzy => "fuzzy",
            Self::Correction => "correction",
            Self::Fallback => "fallback",
        }
    }
}

impl From<DetectionMethod> for ResolutionMethod {
    fn from(method: DetectionMethod) -> Self {
        match method {
            DetectionMethod::Pattern => Self::Pattern,
            DetectionMethod::RosterPrefix => Self::RosterPrefix,
            DetectionMethod::Fuzzy => Self::Fuzzy,
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
