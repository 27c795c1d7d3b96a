//! # Scrubbing Orchestrator
//!
//! Drives one document through the detection state machine (see
//! [`crate::stage`]) and produces its redacted text.
//!
//! Detection is split from placeholder numbering: [`Orchestrator::analyze`]
//! is pure with respect to shared state and may run on many documents in
//! parallel, while [`Analysis::finish`] takes the batch's
//! [`PlaceholderAllocator`] and must be called in input order.
//!
//! ## Security Invariant
//!
//! Once an identity is resolved, every occurrence of the canonical name,
//! its parts, the active nicknames of the first name and the as-written
//! header tokens is replaced, anywhere in the document. For unresolved
//! documents only the header name tokens are touched, since any wider
//! replacement would be a guess.
//!
//! Neither the roster nor the nickname store is mutated here.

use scrub_alias::{CorrectionRecord, NicknameStore};
use scrub_core::{
    first_non_empty_line, word_tokens, ConfidenceTier, DocumentId, EngineConfig,
    ResolutionMethod, RosterEntry, RosterIndex, Token,
};
use scrub_match::{
    header_tokens, is_label_word, DetectionCandidate, FuzzyMatcher, FuzzyOutcome, HeaderToken, PatternDetector,
    PrefixScanner, SimilarityStrategy,
};

use crate::error::EngineError;
use crate::placeholder::PlaceholderAllocator;
use crate::redact::{is_marker_word, redact_spans, Redactor};
use crate::result::{AssignedIdentity, Document, ScrubResult, ScrubWarning};
use crate::stage::{ScrubStage, StageTrace};

/// Confidence recorded for a human-confirmed correction.
pub const CORRECTION_CONFIDENCE: f64 = 1.0;

/// Most header tokens treated as a name in fallback.
const MAX_NAME_TOKENS: usize = 4;

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Resolved {
        entry: RosterEntry,
        tier: ConfidenceTier,
        confidence: f64,
        method: ResolutionMethod,
    },
    Unresolved,
}

/// A scrubbed document awaiting its placeholder number.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    document_id: DocumentId,
    outcome: Outcome,
    redacted_text: String,
    raw_first_line: Option<String>,
    warnings: Vec<ScrubWarning>,
    stages: Vec<ScrubStage>,
}

impl Analysis {
    /// The analyzed document.
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// Whether a roster identity was resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, Outcome::Resolved { .. })
    }

    /// Produce the final result, drawing a placeholder number if the
    /// document is unresolved.
    pub fn finish(self, placeholders: &mut PlaceholderAllocator) -> ScrubResult {
        let (assigned_identity, tier, confidence, method) = match self.outcome {
            Outcome::Resolved {
                entry,
                tier,
                confidence,
                method,
            } => (AssignedIdentity::Student { entry }, tier, confidence, method),
            Outcome::Unresolved => (
                AssignedIdentity::Placeholder {
                    placeholder: placeholders.allocate(),
                },
                ConfidenceTier::Unknown,
                0.0,
                ResolutionMethod::Fallback,
            ),
        };
        tracing::debug!(
            document_id = %self.document_id,
            tier = tier.as_str(),
            method = method.as_str(),
            confidence,
            warnings = self.warnings.len(),
            "document scrubbed"
        );
        ScrubResult {
            document_id: self.document_id,
            assigned_identity,
            confidence_tier: tier,
            confidence,
            redacted_text: self.redacted_text,
            raw_first_line: self.raw_first_line,
            method_used: method,
            warnings: self.warnings,
            stages: self.stages,
        }
    }
}

/// Which identity a resolved document carries, and the as-written tokens
/// that led there.
struct Resolution {
    entry: RosterEntry,
    confidence: f64,
    method: ResolutionMethod,
    written: Vec<Vec<String>>,
}

impl Resolution {
    fn from_candidate(candidate: DetectionCandidate) -> Option<Self> {
        Some(Self {
            entry: candidate.matched_entry?,
            confidence: candidate.confidence,
            method: ResolutionMethod::from(candidate.method),
            written: vec![candidate.span.tokens],
        })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Per-document scrubbing over a roster and a nickname snapshot.
pub struct Orchestrator<'a> {
    roster: &'a RosterIndex,
    aliases: &'a NicknameStore,
    config: &'a EngineConfig,
    strategy: &'a dyn SimilarityStrategy,
    custom_words: Vec<String>,
    custom: Redactor,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator with no custom scrub words.
    pub fn new(
        roster: &'a RosterIndex,
        aliases: &'a NicknameStore,
        config: &'a EngineConfig,
        strategy: &'a dyn SimilarityStrategy,
    ) -> Result<Self, EngineError> {
        let custom = Redactor::new(std::iter::empty::<&str>(), &config.redaction.marker)?;
        Ok(Self {
            roster,
            aliases,
            config,
            strategy,
            custom_words: Vec::new(),
            custom,
        })
    }

    /// Add operator-supplied words redacted from every document, resolved
    /// or not.
    pub fn with_custom_words<I, S>(mut self, words: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_words
            .extend(words.into_iter().map(Into::into).filter(|w| !w.trim().is_empty()));
        self.custom = Redactor::new(&self.custom_words, &self.config.redaction.marker)?;
        Ok(self)
    }

    /// The roster this orchestrator resolves against.
    pub fn roster(&self) -> &'a RosterIndex {
        self.roster
    }

    /// Engine configuration in effect.
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Run detection and redaction on one document.
    pub fn analyze(&self, document: &Document) -> Result<Analysis, EngineError> {
        let text = document.text.as_str();
        let mut trace = StageTrace::start();
        let mut warnings = Vec::new();

        if first_non_empty_line(text).is_none() {
            tracing::debug!(document_id = %document.document_id, "empty document");
            warnings.push(ScrubWarning::EmptyDocument);
            trace.advance(ScrubStage::Fallback);
            return Ok(self.fallback(document, &[], warnings, trace));
        }

        let (resolution, labeled) = self.detect(text, &mut trace, &mut warnings);
        let Some(resolution) = resolution else {
            trace.advance(ScrubStage::Fallback);
            return Ok(self.fallback(document, &labeled, warnings, trace));
        };

        trace.advance(ScrubStage::Redact);
        let redacted_text = self.redact_identity(text, &resolution.entry, &resolution.written)?;
        let tier = ConfidenceTier::for_confidence(
            resolution.confidence,
            self.config.matching.confirm_threshold,
        );
        Ok(Analysis {
            document_id: document.document_id.clone(),
            outcome: Outcome::Resolved {
                entry: resolution.entry,
                tier,
                confidence: resolution.confidence,
                method: resolution.method,
            },
            redacted_text,
            raw_first_line: None,
            warnings,
            stages: trace.finish(),
        })
    }

    /// Scrub one document outside a batch. Unresolved documents draw from
    /// `placeholders`.
    pub fn scrub(
        &self,
        document: &Document,
        placeholders: &mut PlaceholderAllocator,
    ) -> Result<ScrubResult, EngineError> {
        Ok(self.analyze(document)?.finish(placeholders))
    }

    /// Re-scrub `document` for the identity a reviewer confirmed. The
    /// result is always `confirmed`.
    ///
    /// # Errors
    ///
    /// [`EngineError::DocumentMismatch`] if the correction names another
    /// document.
    pub fn supersede(
        &self,
        document: &Document,
        correction: &CorrectionRecord,
    ) -> Result<ScrubResult, EngineError> {
        if correction.document_id != document.document_id {
            return Err(EngineError::DocumentMismatch {
                correction: correction.document_id.to_string(),
                document: document.document_id.to_string(),
            });
        }
        let mut trace = StageTrace::start();
        trace.advance(ScrubStage::Redact);
        let written: Vec<String> = word_tokens(&correction.as_written_name)
            .into_iter()
            .map(|t| t.text)
            .collect();
        let redacted_text =
            self.redact_identity(&document.text, &correction.roster_entry, &[written])?;
        tracing::info!(
            document_id = %document.document_id,
            method = ResolutionMethod::Correction.as_str(),
            "scrub result superseded by correction"
        );
        Ok(ScrubResult {
            document_id: document.document_id.clone(),
            assigned_identity: AssignedIdentity::Student {
                entry: correction.roster_entry.clone(),
            },
            confidence_tier: ConfidenceTier::Confirmed,
            confidence: CORRECTION_CONFIDENCE,
            redacted_text,
            raw_first_line: None,
            method_used: ResolutionMethod::Correction,
            warnings: Vec::new(),
            stages: trace.finish(),
        })
    }

    /// Walk the detection stages. Returns the resolution, if any, and the
    /// labeled header tokens for fallback redaction.
    fn detect(
        &self,
        text: &str,
        trace: &mut StageTrace,
        warnings: &mut Vec<ScrubWarning>,
    ) -> (Option<Resolution>, Vec<HeaderToken>) {
        trace.advance(ScrubStage::PatternDetect);
        let detection =
            PatternDetector::new(self.roster, &self.config.detection, &self.config.matching)
                .detect(text);
        let labeled = detection.labeled_tokens;
        let window = self.config.detection.header_window_lines;
        let matcher = FuzzyMatcher::new(
            self.roster,
            self.aliases,
            &self.config.matching,
            self.strategy,
        );

        if let Some(candidate) = detection.candidate {
            if candidate.tier(self.config.matching.confirm_threshold) == ConfidenceTier::Confirmed
            {
                return (Resolution::from_candidate(candidate), labeled);
            }
            trace.advance(ScrubStage::FuzzyCorroborate);
            let outcome = matcher.resolve(&header_tokens(text, window, &labeled));
            return (self.corroborate(candidate, outcome, warnings), labeled);
        }

        trace.advance(ScrubStage::RosterPrefix);
        if let Some(candidate) =
            PrefixScanner::new(self.roster, &self.config.detection, &self.config.matching).scan(text)
        {
            return (Resolution::from_candidate(candidate), labeled);
        }

        trace.advance(ScrubStage::FuzzyDetect);
        let resolution = match matcher.resolve(&header_tokens(text, window, &labeled)) {
            FuzzyOutcome::Selected(candidate) => Resolution::from_candidate(candidate),
            FuzzyOutcome::Ambiguous {
                best_confidence,
                contenders,
            } => {
                warnings.push(ScrubWarning::AmbiguousMatch {
                    contenders,
                    best_confidence,
                });
                None
            }
            FuzzyOutcome::NoMatch => None,
        };
        (resolution, labeled)
    }

    fn corroborate(
        &self,
        candidate: DetectionCandidate,
        outcome: FuzzyOutcome,
        warnings: &mut Vec<ScrubWarning>,
    ) -> Option<Resolution> {
        // A name contradicted by its own ID label is never settled here.
        let agreed = match &outcome {
            FuzzyOutcome::Selected(fuzzy) if !candidate.id_conflict => fuzzy
                .matched_entry
                .as_ref()
                .filter(|entry| candidate.entry_set().contains(entry))
                .map(|entry| (entry.clone(), fuzzy)),
            _ => None,
        };
        match agreed {
            Some((entry, fuzzy)) => Some(Resolution {
                entry,
                confidence: candidate.confidence.max(fuzzy.confidence),
                method: ResolutionMethod::Pattern,
                written: vec![candidate.span.tokens, fuzzy.span.tokens.clone()],
            }),
            None => {
                tracing::debug!(
                    pattern_confidence = candidate.confidence,
                    ambiguous = candidate.is_ambiguous(),
                    id_conflict = candidate.id_conflict,
                    "pattern candidate not corroborated"
                );
                warnings.push(ScrubWarning::CorroborationFailed);
                match &outcome {
                    FuzzyOutcome::Ambiguous {
                        best_confidence,
                        contenders,
                    } => warnings.push(ScrubWarning::AmbiguousMatch {
                        contenders: *contenders,
                        best_confidence: *best_confidence,
                    }),
                    _ if candidate.is_ambiguous() => warnings.push(ScrubWarning::AmbiguousMatch {
                        contenders: candidate.alternatives.len(),
                        best_confidence: candidate.confidence,
                    }),
                    _ => {}
                }
                None
            }
        }
    }

    fn redact_identity(
        &self,
        text: &str,
        entry: &RosterEntry,
        written: &[Vec<String>],
    ) -> Result<String, EngineError> {
        let mut terms: Vec<String> = vec![
            entry.canonical_full_name.clone(),
            entry.canonical_first.clone(),
            entry.canonical_last.clone(),
        ];
        terms.extend(
            self.aliases
                .active_aliases(&entry.canonical_first)
                .into_iter()
                .map(|a| a.alias_token.clone()),
        );
        for tokens in written {
            terms.extend(tokens.iter().cloned());
            if tokens.len() > 1 {
                terms.push(tokens.join(" "));
            }
        }
        terms.extend(self.custom_words.iter().cloned());
        let redactor = Redactor::new(&terms, &self.config.redaction.marker)?;
        Ok(redactor.redact(text))
    }

    fn fallback(
        &self,
        document: &Document,
        labeled: &[HeaderToken],
        warnings: Vec<ScrubWarning>,
        trace: StageTrace,
    ) -> Analysis {
        let text = document.text.as_str();
        let spans = self.header_name_spans(text, labeled);
        let header_redacted = redact_spans(text, &spans, &self.config.redaction.marker);
        tracing::debug!(
            document_id = %document.document_id,
            header_tokens = spans.len(),
            "no identity resolved, header-only redaction"
        );
        Analysis {
            document_id: document.document_id.clone(),
            outcome: Outcome::Unresolved,
            redacted_text: self.custom.redact(&header_redacted),
            raw_first_line: first_non_empty_line(text).map(|(_, line)| line.to_string()),
            warnings,
            stages: trace.finish(),
        }
    }

    /// Byte ranges of the header's name tokens.
    ///
    /// A labeled value is used when it has at most [`MAX_NAME_TOKENS`]
    /// words. Otherwise the first non-empty line is read: leading label
    /// words and numbers are skipped, then the run of letter-only words
    /// joined by plain whitespace is taken, whatever its capitalization.
    /// The run ends at punctuation, a number or a marker word.
    fn header_name_spans(&self, text: &str, labeled: &[HeaderToken]) -> Vec<(usize, usize)> {
        let marker = self.config.redaction.marker.as_str();
        let tokens: Vec<HeaderToken> = if labeled.is_empty() {
            let Some((line_index, line)) = first_non_empty_line(text) else {
                return Vec::new();
            };
            if line_index >= self.config.detection.header_window_lines {
                return Vec::new();
            }
            leading_name_run(line, marker)
                .into_iter()
                .map(|token| HeaderToken { line_index, token })
                .collect()
        } else {
            let words: Vec<HeaderToken> = labeled
                .iter()
                .filter(|h| !is_marker_word(&h.token.text, marker))
                .cloned()
                .collect();
            if words.len() > MAX_NAME_TOKENS {
                return Vec::new();
            }
            words
        };

        let starts = line_starts(text);
        tokens
            .iter()
            .filter_map(|h| {
                starts
                    .get(h.line_index)
                    .map(|s| (s + h.token.start, s + h.token.end))
            })
            .collect()
    }
}

fn leading_name_run(line: &str, marker: &str) -> Vec<Token> {
    let mut run: Vec<Token> = Vec::new();
    let words = word_tokens(line)
        .into_iter()
        .skip_while(|t| t.is_numeric() || is_label_word(&t.text));
    for token in words {
        if run.len() == MAX_NAME_TOKENS
            || !token.is_alphabetic()
            || is_marker_word(&token.text, marker)
        {
            break;
        }
        if let Some(prev) = run.last() {
            if !line[prev.end..token.start].chars().all(char::is_whitespace) {
                break;
            }
        }
        run.push(token);
    }
    run
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_alias::AliasRegistry;
    use scrub_core::{AliasPolicy, RosterRecord};
    use scrub_match::EditDistanceSoundex;

    fn roster(records: &[RosterRecord]) -> RosterIndex {
        RosterIndex::from_records(records).unwrap()
    }

    fn doc(id: &str, text: &str) -> Document {
        Document::new(DocumentId::new(id).unwrap(), text)
    }

    fn scrub(roster: &RosterIndex, aliases: &NicknameStore, d: &Document) -> ScrubResult {
        let config = EngineConfig::default();
        Orchestrator::new(roster, aliases, &config, &EditDistanceSoundex)
            .unwrap()
            .scrub(d, &mut PlaceholderAllocator::new("Unknown Student"))
            .unwrap()
    }

    #[test]
    fn labeled_name_is_confirmed_and_redacted_everywhere() {
        let roster = roster(&[
            RosterRecord::with_id("John Smith", "S1"),
            RosterRecord::with_id("Kate Bue", "S2"),
        ]);
        let d = doc("e1", "Name: John Smith\n\nJOHN wrote this. Mr smith agreed with john.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Confirmed);
        assert_eq!(result.method_used, ResolutionMethod::Pattern);
        assert_eq!(
            result.assigned_identity.entry().map(|e| e.canonical_full_name.as_str()),
            Some("John Smith")
        );
        let lower = result.redacted_text.to_lowercase();
        assert!(!lower.contains("john"));
        assert!(!lower.contains("smith"));
        assert!(result.redacted_text.starts_with("Name: [REDACTED]"));
        assert!(result.raw_first_line.is_none());
        assert_eq!(
            result.stages,
            vec![
                ScrubStage::Start,
                ScrubStage::PatternDetect,
                ScrubStage::Redact,
                ScrubStage::Done
            ]
        );
    }

    #[test]
    fn unmatched_header_falls_back_to_placeholder() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let d = doc("e1", "Kaitlyn Bue\n\nMy essay about Kaitlyn's summer.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert_eq!(result.method_used, ResolutionMethod::Fallback);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.raw_first_line.as_deref(), Some("Kaitlyn Bue"));
        assert_eq!(
            result.assigned_identity.placeholder().map(|p| p.label.as_str()),
            Some("Unknown Student 01")
        );
        assert!(result.redacted_text.starts_with("[REDACTED] [REDACTED]\n"));
        // body is not touched without a resolved identity
        assert!(result.redacted_text.contains("Kaitlyn's summer"));
        assert_eq!(
            result.stages,
            vec![
                ScrubStage::Start,
                ScrubStage::PatternDetect,
                ScrubStage::RosterPrefix,
                ScrubStage::FuzzyDetect,
                ScrubStage::Fallback,
                ScrubStage::Done
            ]
        );
    }

    #[test]
    fn learned_alias_resolves_after_correction() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let registry = AliasRegistry::in_memory(AliasPolicy::default());
        let kate = roster.entries()[0].clone();
        registry
            .record_correction(&DocumentId::new("e0").unwrap(), &kate, "Kaitlyn Bue")
            .unwrap();
        let store = registry.snapshot();

        let d = doc("e1", "Kaitlyn Bue\n\nKaitlyn went home. Kate Bue said so.");
        let result = scrub(&roster, &store, &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Probable);
        assert_eq!(result.method_used, ResolutionMethod::Fuzzy);
        assert!(result.confidence >= 0.85);
        assert_eq!(result.assigned_identity.entry(), Some(&kate));
        assert!(!result.redacted_text.contains("Kaitlyn"));
        assert!(!result.redacted_text.contains("Kate Bue"));
        assert!(result.raw_first_line.is_none());
    }

    #[test]
    fn empty_document_gets_placeholder_and_warning() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let result = scrub(&roster, &NicknameStore::new(), &doc("e1", "  \n\n "));

        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert_eq!(result.warnings, vec![ScrubWarning::EmptyDocument]);
        assert!(result.raw_first_line.is_none());
        assert_eq!(
            result.stages,
            vec![ScrubStage::Start, ScrubStage::Fallback, ScrubStage::Done]
        );
    }

    #[test]
    fn roster_prefix_resolves_decorated_header() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let d = doc("e1", "Kate Bue - Period 3\n\nBue is my surname.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.method_used, ResolutionMethod::RosterPrefix);
        assert!(result.confidence_tier.is_resolved());
        assert_eq!(
            result.redacted_text,
            "[REDACTED] - Period 3\n\n[REDACTED] is my surname."
        );
        assert_eq!(result.stages[2], ScrubStage::RosterPrefix);
        assert_eq!(result.stages[3], ScrubStage::Redact);
    }

    #[test]
    fn near_tie_is_unknown_with_warning() {
        let roster = roster(&[
            RosterRecord::with_id("Chris Lee", "S1"),
            RosterRecord::with_id("Chris Li", "S2"),
        ]);
        let result = scrub(&roster, &NicknameStore::new(), &doc("e1", "Chris Le\n\nbody"));

        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ScrubWarning::AmbiguousMatch { .. })));
    }

    #[test]
    fn mla_header_is_corroborated_by_fuzzy() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let d = doc("e1", "Kate Bue\nMs. Rivera\nEnglish 10\n\nKate wrote this.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.method_used, ResolutionMethod::Pattern);
        assert_eq!(result.confidence_tier, ConfidenceTier::Confirmed);
        assert!(result.stages.contains(&ScrubStage::FuzzyCorroborate));
        assert!(!result.redacted_text.contains("Kate"));
    }

    #[test]
    fn ambiguous_label_without_corroboration_falls_back() {
        let roster = roster(&[
            RosterRecord::with_id("John Smith", "S1"),
            RosterRecord::with_id("John Smith", "S2"),
        ]);
        let d = doc("e1", "Name: John Smith\n\nJohn wrote this.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert!(result.warnings.contains(&ScrubWarning::CorroborationFailed));
        assert!(result.redacted_text.starts_with("Name: [REDACTED] [REDACTED]\n"));
        assert_eq!(result.raw_first_line.as_deref(), Some("Name: John Smith"));
        assert_eq!(
            &result.stages[1..4],
            &[
                ScrubStage::PatternDetect,
                ScrubStage::FuzzyCorroborate,
                ScrubStage::Fallback
            ]
        );
    }

    #[test]
    fn id_label_contradicting_name_falls_back() {
        let roster = roster(&[
            RosterRecord::with_id("John Smith", "S1"),
            RosterRecord::with_id("Kate Bue", "S2"),
        ]);
        let d = doc("e1", "Name: John Smith\nID: S2\n\nJohn wrote this.");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert!(result.assigned_identity.entry().is_none());
        assert!(result.warnings.contains(&ScrubWarning::CorroborationFailed));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ScrubWarning::AmbiguousMatch { contenders: 2, .. })));
        assert!(result.redacted_text.starts_with("Name: [REDACTED] [REDACTED]\nID: S2\n"));
        assert_eq!(
            &result.stages[1..4],
            &[
                ScrubStage::PatternDetect,
                ScrubStage::FuzzyCorroborate,
                ScrubStage::Fallback
            ]
        );
    }

    #[test]
    fn fallback_redacts_decorated_and_lowercase_headers() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let cases = [
            ("Kaitlyn Bue - Period 3\n\nbody", "[REDACTED] [REDACTED] - Period 3\n\nbody"),
            ("kaitlyn bue\n\nbody", "[REDACTED] [REDACTED]\n\nbody"),
            ("Kaitlyn Bue, English 10\n\nbody", "[REDACTED] [REDACTED], English 10\n\nbody"),
            ("1. Kaitlyn Bue\n\nbody", "1. [REDACTED] [REDACTED]\n\nbody"),
            ("\nStudent Kaitlyn\nbody", "\nStudent [REDACTED]\nbody"),
        ];
        for (text, expected) in cases {
            let result = scrub(&roster, &NicknameStore::new(), &doc("e1", text));
            assert_eq!(result.confidence_tier, ConfidenceTier::Unknown, "{text:?}");
            assert_eq!(result.redacted_text, expected);
            assert_eq!(result.raw_first_line.as_deref(), text.lines().find(|l| !l.is_empty()));
        }
    }

    #[test]
    fn fallback_output_is_stable_under_rescrubbing() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let store = NicknameStore::new();
        let first = scrub(&roster, &store, &doc("e1", "kaitlyn bue - Period 3\n\nbody"));
        let second = scrub(&roster, &store, &doc("e1", &first.redacted_text));
        assert_eq!(second.redacted_text, first.redacted_text);
    }

    #[test]
    fn punctuation_only_document_is_empty() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let result = scrub(&roster, &NicknameStore::new(), &doc("e1", "----\n***"));

        assert_eq!(result.warnings, vec![ScrubWarning::EmptyDocument]);
        assert_eq!(result.redacted_text, "----\n***");
        assert!(result.raw_first_line.is_none());
        assert_eq!(
            result.stages,
            vec![ScrubStage::Start, ScrubStage::Fallback, ScrubStage::Done]
        );
    }

    #[test]
    fn seeded_nickname_alone_is_not_confirmed() {
        let roster = roster(&[RosterRecord::with_id("William Jones", "S1")]);
        let registry = AliasRegistry::in_memory(AliasPolicy::default());
        registry.seed_defaults().unwrap();
        let store = registry.snapshot();

        let result = scrub(&roster, &store, &doc("e1", "Bill Jones\n\nBill wrote this."));
        assert_eq!(result.confidence_tier, ConfidenceTier::Probable);
        assert!(result.needs_review());
        assert!(!result.redacted_text.contains("Bill"));
    }

    #[test]
    fn id_label_disambiguates_duplicate_names() {
        let roster = roster(&[
            RosterRecord::with_id("John Smith", "S1"),
            RosterRecord::with_id("John Smith", "S2"),
        ]);
        let d = doc("e1", "Name: John Smith\nStudent ID: S2\n\nbody");
        let result = scrub(&roster, &NicknameStore::new(), &d);

        assert_eq!(result.confidence_tier, ConfidenceTier::Confirmed);
        assert_eq!(
            result
                .assigned_identity
                .entry()
                .and_then(|e| e.student_id.as_ref())
                .map(|id| id.as_str()),
            Some("S2")
        );
    }

    #[test]
    fn custom_words_apply_to_unresolved_documents() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let config = EngineConfig::default();
        let store = NicknameStore::new();
        let orchestrator = Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex)
            .unwrap()
            .with_custom_words(["Lincoln High"])
            .unwrap();
        let result = orchestrator
            .scrub(
                &doc("e1", "Kaitlyn Bue\nI go to Lincoln   High school."),
                &mut PlaceholderAllocator::new("Unknown Student"),
            )
            .unwrap();
        assert_eq!(result.confidence_tier, ConfidenceTier::Unknown);
        assert_eq!(
            result.redacted_text,
            "[REDACTED] [REDACTED]\nI go to [REDACTED] school."
        );
    }

    #[test]
    fn second_pass_over_redacted_output_changes_nothing() {
        let roster = roster(&[RosterRecord::with_id("John Smith", "S1")]);
        let store = NicknameStore::new();
        let first = scrub(&roster, &store, &doc("e1", "Name: John Smith\n\nJohn wrote this."));
        let second = scrub(&roster, &store, &doc("e1", &first.redacted_text));
        assert_eq!(second.redacted_text, first.redacted_text);
    }

    #[test]
    fn supersede_confirms_corrected_identity() {
        let roster = roster(&[RosterRecord::with_id("Kate Bue", "S1")]);
        let registry = AliasRegistry::in_memory(AliasPolicy::default());
        let kate = roster.entries()[0].clone();
        let d = doc("e1", "Kaitlyn Bue\n\nKaitlyn's essay.");
        let record = registry
            .record_correction(&d.document_id, &kate, "Kaitlyn Bue")
            .unwrap();
        let store = registry.snapshot();
        let config = EngineConfig::default();
        let orchestrator =
            Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();

        let result = orchestrator.supersede(&d, &record).unwrap();
        assert_eq!(result.confidence_tier, ConfidenceTier::Confirmed);
        assert_eq!(result.method_used, ResolutionMethod::Correction);
        assert_eq!(result.confidence, CORRECTION_CONFIDENCE);
        assert_eq!(result.redacted_text, "[REDACTED]\n\n[REDACTED]'s essay.");
        assert_eq!(
            result.stages,
            vec![ScrubStage::Start, ScrubStage::Redact, ScrubStage::Done]
        );

        let other = doc("e2", "text");
        assert!(matches!(
            orchestrator.supersede(&other, &record),
            Err(EngineError::DocumentMismatch { .. })
        ));
    }
}
