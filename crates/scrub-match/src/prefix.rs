//! # Roster-Prefix Scanner
//!
//! Catches unlabeled headers that start with a roster name followed by
//! other text (`Kate Bue - Period 3`, `Bue, Kate 10/04`). Each header-window
//! line is normalized and checked for a roster full name at its start, on
//! a word boundary, in `first last` or `last first` order.
//!
//! Exactly one distinct roster entry across the window yields a candidate.
//! Several entries yield nothing: ambiguity is never resolved by guessing.

use std::collections::BTreeMap;

use scrub_core::{
    normalize_name, word_tokens, DetectionConfig, DetectionMethod, MatchingConfig, RosterIndex,
    Token,
};

use crate::candidate::{DetectionCandidate, TokenSpan};

/// Scanner for roster names at the start of header lines.
#[derive(Debug, Clone, Copy)]
pub struct PrefixScanner<'a> {
    roster: &'a RosterIndex,
    detection: &'a DetectionConfig,
    matching: &'a MatchingConfig,
}

impl<'a> PrefixScanner<'a> {
    /// Scanner over `roster`.
    pub fn new(
        roster: &'a RosterIndex,
        detection: &'a DetectionConfig,
        matching: &'a MatchingConfig,
    ) -> Self {
        Self {
            roster,
            detection,
            matching,
        }
    }

    /// Scan the header window of `text`.
    pub fn scan(&self, text: &str) -> Option<DetectionCandidate> {
        // roster position -> first (line index, matched ordering)
        let mut found: BTreeMap<usize, (usize, String)> = BTreeMap::new();
        for (line_index, line) in text.lines().take(self.detection.header_window_lines).enumerate() {
            let normalized = normalize_name(line);
            if normalized.is_empty() {
                continue;
            }
            for (pos, entry) in self.roster.entries().iter().enumerate() {
                for ordering in entry.normalized_orderings() {
                    if !ordering.is_empty() && starts_on_boundary(&normalized, &ordering) {
                        found.entry(pos).or_insert((line_index, ordering));
                    }
                }
            }
        }

        if found.len() > 1 {
            tracing::debug!(entries = found.len(), "roster prefix ambiguous");
            return None;
        }
        let (pos, (line_index, ordering)) = found.into_iter().next()?;
        let line = text.lines().nth(line_index)?;
        let tokens = word_tokens(line);
        let used = prefix_token_count(&tokens, &ordering).unwrap_or(tokens.len());
        let span = TokenSpan::covering(line_index, &tokens[..used])?;
        let entry = self.roster.entries().get(pos)?.clone();
        Some(DetectionCandidate::resolved(
            span,
            entry,
            DetectionMethod::RosterPrefix,
            self.matching.prefix_confidence,
            false,
        ))
    }
}

fn starts_on_boundary(haystack: &str, prefix: &str) -> bool {
    haystack
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

/// How many leading tokens normalize to exactly `ordering`.
fn prefix_token_count(tokens: &[Token], ordering: &str) -> Option<usize> {
    let mut acc = String::new();
    for (i, t) in tokens.iter().enumerate() {
        if !acc.is_empty() {
            acc.push(' ');
        }
        acc.push_str(&t.normalized());
        if acc == ordering {
            return Some(i + 1);
        }
        if acc.len() >= ordering.len() {
            break;
        }
    }
    None
}
