//! # Pattern Detector
//!
//! Finds explicitly labeled identity fields in a document's header window
//! (the first `detection.header_window_lines` lines):
//!
//! ```text
//! Name: John Smith      Student ID: 20417
//! Student Name - Kate Bue
//! ```
//!
//! Labels are matched case-insensitively and must be followed by `:` or a
//! spaced `-`. A line may carry several fields; each value runs to the next
//! label on the line.
//!
//! When no labeled name resolves, an unlabeled MLA-style header (a first
//! line of two to four capitalized words) is tried as a weaker signal.
//!
//! Outcomes:
//!
//! | Finding | Tier | Confidence |
//! |---------|------|------------|
//! | labeled name, one roster entry | confirmed | `exact_confidence` |
//! | labeled id, known student | confirmed | `exact_confidence` |
//! | labeled name, several entries | probable, ambiguous | `ambiguous_label_confidence` |
//! | MLA header, one roster entry | probable | `mla_confidence` |
//!
//! An id that picks one of an ambiguous name's entries settles it. An id
//! that contradicts a uniquely resolved name makes the result ambiguous.

use std::sync::OnceLock;

use regex::Regex;

use scrub_core::{
    first_non_empty_line, word_tokens, DetectionConfig, DetectionMethod, MatchingConfig,
    RosterEntry, RosterIndex,
};

use crate::candidate::{DetectionCandidate, HeaderToken, TokenSpan};

static LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn label_re() -> &'static Regex {
    LABEL_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(student\s+name|student\s+id|student|name|id)(?:\s*:|\s+-|-\s)\s*")
            .expect("BUG: hardcoded label pattern rejected by regex")
    })
}

/// What a label announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// `Name`, `Student`, `Student Name`.
    Name,
    /// `ID`, `Student ID`.
    Id,
}

/// One labeled field on a line. Offsets are bytes within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledField {
    /// The label kind.
    pub kind: LabelKind,
    /// Start of the label itself.
    pub label_start: usize,
    /// Start of the value.
    pub value_start: usize,
    /// End of the value.
    pub value_end: usize,
}

impl LabeledField {
    /// The field's value text within `line`.
    pub fn value<'l>(&self, line: &'l str) -> &'l str {
        &line[self.value_start..self.value_end]
    }
}

/// Every labeled field on `line`, left to right.
pub fn labeled_fields(line: &str) -> Vec<LabeledField> {
    let matches: Vec<_> = label_re().captures_iter(line).collect();
    let mut fields = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(line.len(), |m| m.start());
        let kind = if label.as_str().to_ascii_lowercase().ends_with("id") {
            LabelKind::Id
        } else {
            LabelKind::Name
        };
        fields.push(LabeledField {
            kind,
            label_start: whole.start(),
            value_start: whole.end(),
            value_end,
        });
    }
    fields
}

/// Whether any label occurs on `line`.
pub fn has_label(line: &str) -> bool {
    label_re().is_match(line)
}

/// Whether `word` is one of the label words.
pub fn is_label_word(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "name" | "student" | "id"
    )
}

/// Result of pattern detection for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternDetection {
    /// The best candidate, if any label or header resolved.
    pub candidate: Option<DetectionCandidate>,
    /// Name tokens of the first labeled name field, for the fuzzy matcher.
    pub labeled_tokens: Vec<HeaderToken>,
}

struct NameField<'r> {
    tokens: Vec<HeaderToken>,
    span: TokenSpan,
    hits: Vec<&'r RosterEntry>,
}

/// Labeled-field and MLA-header detector.
#[derive(Debug, Clone, Copy)]
pub struct PatternDetector<'a> {
    roster: &'a RosterIndex,
    detection: &'a DetectionConfig,
    matching: &'a MatchingConfig,
}

impl<'a> PatternDetector<'a> {
    /// Detector over `roster` with the given thresholds.
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
    pub fn detect(&self, text: &str) -> PatternDetection {
        let mut name_fields: Vec<NameField<'a>> = Vec::new();
        let mut id_hit: Option<(&'a RosterEntry, TokenSpan)> = None;

        for (line_index, line) in text.lines().take(self.detection.header_window_lines).enumerate() {
            for field in labeled_fields(line) {
                match field.kind {
                    LabelKind::Name => {
                        if let Some(nf) = self.resolve_name(line_index, line, &field) {
                            name_fields.push(nf);
                        }
                    }
                    LabelKind::Id if id_hit.is_none() => {
                        id_hit = self.resolve_id(line_index, line, &field);
                    }
                    LabelKind::Id => {}
                }
            }
        }

        let labeled_tokens = name_fields
            .first()
            .map(|f| f.tokens.clone())
            .unwrap_or_default();
        let primary = name_fields
            .iter()
            .find(|f| f.hits.len() == 1)
            .or_else(|| name_fields.iter().find(|f| f.hits.len() > 1))
            .or_else(|| name_fields.first());

        let candidate = match (primary, id_hit) {
            (Some(field), id) if !field.hits.is_empty() => Some(self.combine(field, id)),
            (field, Some((entry, id_span))) => {
                let span = field.map_or(id_span, |f| f.span.clone());
                Some(DetectionCandidate::resolved(
                    span,
                    entry.clone(),
                    DetectionMethod::Pattern,
                    self.matching.exact_confidence,
                    true,
                ))
            }
            (Some(_), None) => None,
            (None, None) => self.mla_header(text),
        };

        if let Some(c) = &candidate {
            tracing::debug!(
                confidence = c.confidence,
                ambiguous = c.is_ambiguous(),
                labeled = c.labeled,
                "pattern candidate"
            );
        }
        PatternDetection {
            candidate,
            labeled_tokens,
        }
    }

    fn combine(
        &self,
        field: &NameField<'a>,
        id: Option<(&'a RosterEntry, TokenSpan)>,
    ) -> DetectionCandidate {
        let exact = self.matching.exact_confidence;
        let span = field.span.clone();
        match (field.hits.as_slice(), id) {
            ([entry], None) => {
                DetectionCandidate::resolved(span, (*entry).clone(), DetectionMethod::Pattern, exact, true)
            }
            ([entry], Some((by_id, _))) if *entry == by_id => {
                DetectionCandidate::resolved(span, (*entry).clone(), DetectionMethod::Pattern, exact, true)
            }
            (hits, Some((by_id, _))) if hits.len() > 1 && hits.contains(&by_id) => {
                DetectionCandidate::resolved(span, by_id.clone(), DetectionMethod::Pattern, exact, true)
            }
            (hits, id) => {
                let mut alternatives: Vec<RosterEntry> = hits.iter().map(|e| (*e).clone()).collect();
                if let Some((by_id, _)) = id {
                    if !alternatives.contains(by_id) {
                        alternatives.push(by_id.clone());
                    }
                }
                DetectionCandidate {
                    span,
                    matched_entry: None,
                    alternatives,
                    method: DetectionMethod::Pattern,
                    confidence: self.matching.ambiguous_label_confidence,
                    labeled: true,
                    id_conflict: id.is_some(),
                }
            }
        }
    }

    fn resolve_name(
        &self,
        line_index: usize,
        line: &str,
        field: &LabeledField,
    ) -> Option<NameField<'a>> {
        let offset = field.value_start;
        let tokens: Vec<_> = word_tokens(field.value(line))
            .into_iter()
            .take_while(|t| t.is_alphabetic())
            .map(|mut t| {
                t.start += offset;
                t.end += offset;
                t
            })
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let mut hits = Vec::new();
        let mut used = tokens.len();
        for n in (2..=tokens.len().min(4)).rev() {
            let joined = join_tokens(&tokens[..n]);
            let found = self.roster.lookup_full(&joined);
            if !found.is_empty() {
                hits = found;
                used = n;
                break;
            }
        }

        let span = TokenSpan::covering(line_index, &tokens[..used])?;
        Some(NameField {
            tokens: tokens
                .into_iter()
                .map(|token| HeaderToken { line_index, token })
                .collect(),
            span,
            hits,
        })
    }

    fn resolve_id(
        &self,
        line_index: usize,
        line: &str,
        field: &LabeledField,
    ) -> Option<(&'a RosterEntry, TokenSpan)> {
        let mut token = word_tokens(field.value(line)).into_iter().next()?;
        let entry = self.roster.lookup_id(&token.text)?;
        token.start += field.value_start;
        token.end += field.value_start;
        let span = TokenSpan::covering(line_index, std::slice::from_ref(&token))?;
        Some((entry, span))
    }

    fn mla_header(&self, text: &str) -> Option<DetectionCandidate> {
        let (line_index, line) = first_non_empty_line(text)?;
        if line_index >= self.detection.header_window_lines || has_label(line) {
            return None;
        }
        let tokens = word_tokens(line);
        let name_like = (2..=4).contains(&tokens.len())
            && tokens.iter().all(|t| t.is_alphabetic() && t.is_capitalized());
        if !name_like {
            return None;
        }
        let hits = self.roster.lookup_full(&join_tokens(&tokens));
        let [entry] = hits.as_slice() else {
            return None;
        };
        Some(DetectionCandidate::resolved(
            TokenSpan::covering(line_index, &tokens)?,
            (*entry).clone(),
            DetectionMethod::Pattern,
            self.matching.mla_confidence,
            false,
        ))
    }
}

fn join_tokens(tokens: &[scrub_core::Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_core::{ConfidenceTier, RosterRecord};

    fn roster() -> RosterIndex {
        RosterIndex::from_records(&[
            RosterRecord::with_id("John Smith", "1234"),
            RosterRecord::with_id("Kate Bue", "5678"),
            RosterRecord::with_id("Lee Kim", "1111"),
            RosterRecord::with_id("Kim Lee", "2222"),
        ])
        .unwrap()
    }

    fn detect(text: &str) -> PatternDetection {
        let roster = roster();
        let detection = DetectionConfig::default();
        let matching = MatchingConfig::default();
        PatternDetector::new(&roster, &detection, &matching).detect(text)
    }

    #[test]
    fn finds_several_fields_on_one_line() {
        let fields = labeled_fields("Name: John Smith   Student ID: 1234");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].kind, LabelKind::Name);
        assert_eq!(fields[0].value("Name: John Smith   Student ID: 1234"), "John Smith   ");
        assert_eq!(fields[1].kind, LabelKind::Id);
    }

    #[test]
    fn label_grammar() {
        assert_eq!(labeled_fields("STUDENT NAME - Kate Bue")[0].kind, LabelKind::Name);
        assert_eq!(labeled_fields("student id: 5")[0].kind, LabelKind::Id);
        assert!(labeled_fields("Surname: Bue").is_empty());
        assert!(labeled_fields("a student-athlete essay").is_empty());
        assert!(labeled_fields("My name is Kate").is_empty());
    }

    #[test]
    fn labeled_unique_name_is_confirmed() {
        let det = detect("Name: John Smith\nEssay body");
        let c = det.candidate.unwrap();
        assert_eq!(c.matched_entry.unwrap().canonical_full_name, "John Smith");
        assert_eq!(c.confidence, 0.95);
        assert!(c.labeled);
        assert_eq!(c.span.tokens, vec!["John", "Smith"]);
    }

    #[test]
    fn trailing_words_after_name_are_ignored() {
        let det = detect("Student: john smith period 3\n");
        assert!(det.candidate.unwrap().matched_entry.is_some());
    }

    #[test]
    fn labeled_id_alone_confirms() {
        let det = detect("ID: 5678\nbody");
        let c = det.candidate.unwrap();
        assert_eq!(c.matched_entry.as_ref().unwrap().canonical_last, "Bue");
        assert_eq!(c.tier(0.9), ConfidenceTier::Confirmed);
    }

    #[test]
    fn ambiguous_name_is_probable_until_id_settles_it() {
        let det = detect("Name: Lee Kim\n");
        let c = det.candidate.unwrap();
        assert!(c.is_ambiguous());
        assert_eq!(c.confidence, 0.7);
        assert_eq!(c.alternatives.len(), 2);
        assert!(!c.id_conflict);

        let det = detect("Name: Lee Kim   ID: 2222\n");
        let c = det.candidate.unwrap();
        assert_eq!(c.matched_entry.unwrap().canonical_first, "Kim");
    }

    #[test]
    fn contradicting_id_makes_name_ambiguous() {
        let det = detect("Name: John Smith\nID: 5678\n");
        let c = det.candidate.unwrap();
        assert!(c.is_ambiguous());
        assert_eq!(c.alternatives.len(), 2);
        assert!(c.id_conflict);
    }

    #[test]
    fn unresolved_label_hands_tokens_on() {
        let det = detect("Name: Kaitlyn Bue\nbody");
        assert!(det.candidate.is_none());
        let words: Vec<&str> = det.labeled_tokens.iter().map(|t| t.token.text.as_str()).collect();
        assert_eq!(words, vec!["Kaitlyn", "Bue"]);
        assert_eq!(det.labeled_tokens[0].token.start, 6);
    }

    #[test]
    fn mla_header_is_probable() {
        let det = detect("\nKate Bue\nMs. Rivera\nEnglish 10\n");
        let c = det.candidate.unwrap();
        assert_eq!(c.confidence, 0.8);
        assert!(!c.labeled);
        assert_eq!(c.tier(0.9), ConfidenceTier::Probable);
        assert_eq!(c.span.line_index, 1);
    }

    #[test]
    fn lowercase_first_line_is_not_a_header() {
        assert!(detect("kate bue\nbody").candidate.is_none());
    }

    #[test]
    fn labels_outside_window_are_ignored() {
        let text = format!("{}Name: John Smith\n", "filler\n".repeat(10));
        assert!(detect(&text).candidate.is_none());
    }
}
