//! # Scrub Stages
//!
//! The per-document state machine:
//!
//! ```text
//! Start → PatternDetect ─┬─ confirmed ──────────────────────────────→ Redact ─┐
//!                        ├─ probable → FuzzyCorroborate ─┬─ agrees ─→ Redact  │
//!                        │                               └─ else ──→ Fallback ┤
//!                        └─ none → RosterPrefix ─┬─ hit ───────────→ Redact   ├→ Done
//!                                                └─ miss → FuzzyDetect ─┬→ Redact
//!                                                                       └→ Fallback
//! ```
//!
//! Empty documents go straight from `Start` to `Fallback`; a correction
//! goes straight from `Start` to `Redact`. Every result records the path
//! it took.

use serde::{Deserialize, Serialize};

/// A stage of the per-document state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrubStage {
    /// Nothing done yet.
    Start,
    /// Labeled fields and MLA header.
    PatternDetect,
    /// Fuzzy matching checks a probable pattern candidate.
    FuzzyCorroborate,
    /// Roster names at the start of header lines.
    RosterPrefix,
    /// Fuzzy and nickname matching on its own.
    FuzzyDetect,
    /// Full-document redaction for a resolved identity.
    Redact,
    /// Placeholder identity and header-only redaction.
    Fallback,
    /// Result produced.
    Done,
}

impl ScrubStage {
    /// Returns the canonical stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::PatternDetect => "PATTERN_DETECT",
            Self::FuzzyCorroborate => "FUZZY_CORROBORATE",
            Self::RosterPrefix => "ROSTER_PREFIX",
            Self::FuzzyDetect => "FUZZY_DETECT",
            Self::Redact => "REDACT",
            Self::Fallback => "FALLBACK",
            Self::Done => "DONE",
        }
    }

    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether the machine may move from `self` to `to`.
    pub fn can_transition_to(&self, to: ScrubStage) -> bool {
        use ScrubStage::*;
        matches!(
            (*self, to),
            (Start, PatternDetect)
                | (Start, Fallback)
                | (Start, Redact)
                | (PatternDetect, Redact)
                | (PatternDetect, FuzzyCorroborate)
                | (PatternDetect, RosterPrefix)
                | (FuzzyCorroborate, Redact)
                | (FuzzyCorroborate, Fallback)
                | (RosterPrefix, Redact)
                | (RosterPrefix, FuzzyDetect)
                | (FuzzyDetect, Redact)
                | (FuzzyDetect, Fallback)
                | (Redact, Done)
                | (Fallback, Done)
        )
    }
}

impl std::fmt::Display for ScrubStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The path one document took through the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTrace {
    stages: Vec<ScrubStage>,
}

impl StageTrace {
    /// A trace positioned at `Start`.
    pub fn start() -> Self {
        Self {
            stages: vec![ScrubStage::Start],
        }
    }

    /// The current stage.
    pub fn current(&self) -> ScrubStage {
        self.stages.last().copied().unwrap_or(ScrubStage::Start)
    }

    /// Move to `to`. The orchestrator only takes edges of the machine;
    /// anything else is a bug caught in debug builds.
    pub fn advance(&mut self, to: ScrubStage) {
        debug_assert!(
            self.current().can_transition_to(to),
            "invalid scrub transition {} -> {}",
            self.current(),
            to
        );
        self.stages.push(to);
    }

    /// Finish the trace at `Done` and return the visited stages.
    pub fn finish(mut self) -> Vec<ScrubStage> {
        self.advance(ScrubStage::Done);
        self.stages
    }
}
