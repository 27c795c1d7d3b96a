//! Detection candidates: a proposed identity for one document, produced
//! by a detector. Transient; never persisted.

use scrub_core::{ConfidenceTier, DetectionMethod, RosterEntry, Token};

/// Where in the header window a candidate's name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    /// Zero-based line index within the document.
    pub line_index: usize,
    /// Byte offset within the line.
    pub start: usize,
    /// Byte offset one past the end within the line.
    pub end: usize,
    /// The name tokens as written.
    pub tokens: Vec<String>,
}

impl TokenSpan {
    /// Span covering `tokens`, which must come from line `line_index`.
    pub fn covering(line_index: usize, tokens: &[Token]) -> Option<Self> {
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(Self {
            line_index,
            start: first.start,
            end: last.end,
            tokens: tokens.iter().map(|t| t.text.clone()).collect(),
        })
    }
}

/// A word token together with the document line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderToken {
    /// Zero-based line index within the document.
    pub line_index: usize,
    /// The token.
    pub token: Token,
}

/// A proposed identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    /// The as-written name this candidate rests on.
    pub span: TokenSpan,
    /// The single roster entry, when the candidate resolved to one.
    pub matched_entry: Option<RosterEntry>,
    /// Every entry an ambiguous label resolved to. Empty otherwise.
    pub alternatives: Vec<RosterEntry>,
    /// Which detector produced the candidate.
    pub method: DetectionMethod,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Whether the name came from an explicit label.
    pub labeled: bool,
    /// Whether a labeled ID named an entry the labeled name did not.
    /// Such a candidate cannot be settled by re-reading the same name.
    pub id_conflict: bool,
}

impl DetectionCandidate {
    /// A candidate resolved to exactly one entry.
    pub fn resolved(
        span: TokenSpan,
        entry: RosterEntry,
        method: DetectionMethod,
        confidence: f64,
        labeled: bool,
    ) -> Self {
        Self {
            span,
            matched_entry: Some(entry),
            alternatives: Vec::new(),
            method,
            confidence,
            labeled,
            id_conflict: false,
        }
    }

    /// Whether the candidate names several possible entries.
    pub fn is_ambiguous(&self) -> bool {
        self.matched_entry.is_none() && !self.alternatives.is_empty()
    }

    /// Entries this candidate is compatible with.
    pub fn entry_set(&self) -> Vec<&RosterEntry> {
        match &self.matched_entry {
            Some(entry) => vec![entry],
            None => self.alternatives.iter().collect(),
        }
    }

    /// Tier of this candidate. Ambiguous candidates are never above
    /// `probable`.
    pub fn tier(&self, confirm_threshold: f64) -> ConfidenceTier {
        if self.is_ambiguous() {
            return ConfidenceTier::Probable;
        }
        match self.matched_entry {
            Some(_) => ConfidenceTier::for_confidence(self.confidence, confirm_threshold),
            None => ConfidenceTier::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_core::word_tokens;

    fn span() -> TokenSpan {
        TokenSpan::covering(0, &word_tokens("Name: John Smith")[1..]).unwrap()
    }

    #[test]
    fn span_covers_token_range() {
        let s = span();
        assert_eq!((s.start, s.end), (6, 16));
        assert_eq!(s.tokens, vec!["John", "Smith"]);
        assert!(TokenSpan::covering(0, &[]).is_none());
    }

    #[test]
    fn ambiguous_candidate_is_probable() {
        let c = DetectionCandidate {
            span: span(),
            matched_entry: None,
            alternatives: vec![
                RosterEntry::new("John", "Smith", None),
                RosterEntry::new("Smith", "John", None),
            ],
            method: DetectionMethod::Pattern,
            confidence: 0.95,
            labeled: true,
            id_conflict: false,
        };
        assert!(c.is_ambiguous());
        assert_eq!(c.tier(0.9), ConfidenceTier::Probable);
        assert_eq!(c.entry_set().len(), 2);
    }

    #[test]
    fn resolved_candidate_tier_follows_confidence() {
        let entry = RosterEntry::new("John", "Smith", None);
        let c = DetectionCandidate::resolved(span(), entry, DetectionMethod::Pattern, 0.95, true);
        assert_eq!(c.tier(0.9), ConfidenceTier::Confirmed);
        let c = DetectionCandidate { confidence: 0.8, ..c };
        assert_eq!(c.tier(0.9), ConfidenceTier::Probable);
    }
}
