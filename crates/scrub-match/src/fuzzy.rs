//! # Fuzzy Name Matcher
//!
//! Resolves a header that names the student imperfectly: a nickname, a
//! misspelling, a reordered name. Every header token is tried as a last
//! name; for each roster entry with that last name, the remaining tokens
//! are compared with the entry's first name.
//!
//! ## Scoring
//!
//! | First-name evidence | Confidence |
//! |---------------------|------------|
//! | normalized equality | `exact_confidence` |
//! | active alias at or above `alias_min_confidence` | the alias's confidence |
//! | ratio at or above `similarity_threshold`, or same Soundex code | `min(ratio, similarity_cap)` |
//!
//! A token that only resembles a roster last name (ratio or Soundex)
//! scores `surname_variant_confidence` when the first name matches
//! exactly.
//!
//! ## Selection
//!
//! The best entry must reach `confidence_floor`, and every other scored
//! entry must sit more than `tie_margin` below it. Otherwise the outcome
//! is ambiguous. The result does not depend on roster order.

use scrub_alias::NicknameStore;
use scrub_core::{
    first_non_empty_line, word_tokens, DetectionMethod, MatchingConfig, RosterEntry, RosterIndex,
};

use crate::candidate::{DetectionCandidate, HeaderToken, TokenSpan};
use crate::pattern::is_label_word;
use crate::similarity::SimilarityStrategy;

/// Outcome of fuzzy matching.
#[derive(Debug, Clone, PartialEq)]
pub enum FuzzyOutcome {
    /// One entry selected.
    Selected(DetectionCandidate),
    /// Several entries scored within the tie margin of the best.
    Ambiguous {
        /// Best confidence seen.
        best_confidence: f64,
        /// Number of entries within the margin, the best included.
        contenders: usize,
    },
    /// Nothing reached the confidence floor.
    NoMatch,
}

impl FuzzyOutcome {
    /// The selected candidate, if any.
    pub fn selected(&self) -> Option<&DetectionCandidate> {
        match self {
            Self::Selected(c) => Some(c),
            _ => None,
        }
    }
}

/// Tokens the fuzzy matcher should consider for a document.
///
/// A labeled name value wins when present. Otherwise the first non-empty
/// line inside the header window is used, minus label words and tokens
/// that contain digits.
pub fn header_tokens(text: &str, window_lines: usize, labeled: &[HeaderToken]) -> Vec<HeaderToken> {
    if !labeled.is_empty() {
        return labeled.to_vec();
    }
    let Some((line_index, line)) = first_non_empty_line(text) else {
        return Vec::new();
    };
    if line_index >= window_lines {
        return Vec::new();
    }
    word_tokens(line)
        .into_iter()
        .filter(|t| t.is_alphabetic() && !is_label_word(&t.text))
        .map(|token| HeaderToken { line_index, token })
        .collect()
}

struct Scored<'r> {
    entry: &'r RosterEntry,
    confidence: f64,
    used: Vec<usize>,
}

/// Roster-informed fuzzy and nickname matcher.
#[derive(Clone, Copy)]
pub struct FuzzyMatcher<'a> {
    roster: &'a RosterIndex,
    aliases: &'a NicknameStore,
    matching: &'a MatchingConfig,
    strategy: &'a dyn SimilarityStrategy,
}

impl<'a> FuzzyMatcher<'a> {
    /// Matcher over `roster` and an alias snapshot.
    pub fn new(
        roster: &'a RosterIndex,
        aliases: &'a NicknameStore,
        matching: &'a MatchingConfig,
        strategy: &'a dyn SimilarityStrategy,
    ) -> Self {
        Self {
            roster,
            aliases,
            matching,
            strategy,
        }
    }

    /// Score `tokens` against the roster and select an entry.
    pub fn resolve(&self, tokens: &[HeaderToken]) -> FuzzyOutcome {
        let mut scored = self.score(tokens);
        scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let Some(best) = scored.first() else {
            return FuzzyOutcome::NoMatch;
        };
        if best.confidence < self.matching.confidence_floor {
            tracing::debug!(best = best.confidence, "fuzzy match below floor");
            return FuzzyOutcome::NoMatch;
        }
        let contenders = 1 + scored[1..]
            .iter()
            .filter(|s| best.confidence - s.confidence <= self.matching.tie_margin)
            .count();
        if contenders > 1 {
            tracing::debug!(
                best = best.confidence,
                contenders,
                strategy = self.strategy.name(),
                "fuzzy match ambiguous"
            );
            return FuzzyOutcome::Ambiguous {
                best_confidence: best.confidence,
                contenders,
            };
        }

        let Some(span) = span_of(tokens, &best.used) else {
            return FuzzyOutcome::NoMatch;
        };
        tracing::debug!(confidence = best.confidence, "fuzzy match selected");
        FuzzyOutcome::Selected(DetectionCandidate::resolved(
            span,
            best.entry.clone(),
            DetectionMethod::Fuzzy,
            best.confidence,
            false,
        ))
    }

    fn score(&self, tokens: &[HeaderToken]) -> Vec<Scored<'a>> {
        let normalized: Vec<String> = tokens.iter().map(|t| t.token.normalized()).collect();
        let mut scored: Vec<Scored<'a>> = Vec::new();

        for (i, last) in normalized.iter().enumerate() {
            if last.is_empty() {
                continue;
            }
            for entry in self.roster.lookup_last(last) {
                if let Some((confidence, mut used)) = self.score_first(entry, &normalized, i) {
                    used.push(i);
                    upsert(&mut scored, entry, confidence, used);
                }
            }

            for (key, entries) in self.roster.last_names() {
                if key == last.as_str() || !self.resembles(last, key) {
                    continue;
                }
                for entry in entries {
                    let first = entry.normalized_first();
                    if let Some(j) = (0..normalized.len()).find(|&j| j != i && normalized[j] == first) {
                        upsert(
                            &mut scored,
                            entry,
                            self.matching.surname_variant_confidence,
                            vec![j, i],
                        );
                    }
                }
            }
        }
        scored
    }

    /// Best first-name evidence for `entry` among the tokens other than
    /// the last-name token at `last_idx`.
    fn score_first(
        &self,
        entry: &RosterEntry,
        normalized: &[String],
        last_idx: usize,
    ) -> Option<(f64, Vec<usize>)> {
        let first = entry.normalized_first();
        let others: Vec<usize> = (0..normalized.len()).filter(|&j| j != last_idx).collect();

        let mut options: Vec<(String, Vec<usize>)> = others
            .iter()
            .map(|&j| (normalized[j].clone(), vec![j]))
            .collect();
        if others.len() > 1 {
            let joined = others
                .iter()
                .map(|&j| normalized[j].as_str())
                .collect::<Vec<_>>()
                .join(" ");
            options.push((joined, others.clone()));
        }

        let mut best: Option<(f64, Vec<usize>)> = None;
        for (candidate, used) in options {
            let Some(confidence) = self.first_name_confidence(entry, &first, &candidate) else {
                continue;
            };
            if best.as_ref().map_or(true, |(b, _)| confidence > *b) {
                best = Some((confidence, used));
            }
        }
        best
    }

    fn first_name_confidence(&self, entry: &RosterEntry, first: &str, candidate: &str) -> Option<f64> {
        if candidate.is_empty() {
            return None;
        }
        if candidate == first {
            return Some(self.matching.exact_confidence);
        }
        if let Some(alias) =
            self.aliases
                .matching_alias(&entry.canonical_first, candidate, self.matching.alias_min_confidence)
        {
            return Some(alias.confidence);
        }
        let ratio = self.strategy.ratio(candidate, first);
        if ratio >= self.matching.similarity_threshold || self.strategy.phonetic_match(candidate, first) {
            return Some(ratio.min(self.matching.similarity_cap));
        }
        None
    }

    fn resembles(&self, a: &str, b: &str) -> bool {
        self.strategy.ratio(a, b) >= self.matching.similarity_threshold
            || self.strategy.phonetic_match(a, b)
    }
}

fn upsert<'r>(scored: &mut Vec<Scored<'r>>, entry: &'r RosterEntry, confidence: f64, used: Vec<usize>) {
    match scored.iter_mut().find(|s| std::ptr::eq(s.entry, entry)) {
        Some(existing) if confidence > existing.confidence => {
            existing.confidence = confidence;
            existing.used = used;
        }
        Some(_) => {}
        None => scored.push(Scored {
            entry,
            confidence,
            used,
        }),
    }
}

fn span_of(tokens: &[HeaderToken], used: &[usize]) -> Option<TokenSpan> {
    let mut used = used.to_vec();
    used.sort_unstable();
    used.dedup();
    let picked: Vec<&HeaderToken> = used.iter().filter_map(|&i| tokens.get(i)).collect();
    let first = picked.first()?;
    let on_line: Vec<&&HeaderToken> = picked
        .iter()
        .filter(|t| t.line_index == first.line_index)
        .collect();
    Some(TokenSpan {
        line_index: first.line_index,
        start: on_line.iter().map(|t| t.token.start).min()?,
        end: on_line.iter().map(|t| t.token.end).max()?,
        tokens: picked.iter().map(|t| t.token.text.clone()).collect(),
    })
}
