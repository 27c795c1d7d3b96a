//! # Batch Processing
//!
//! Scrubs a set of documents against one roster and one nickname snapshot.
//!
//! ## Thread Safety
//!
//! Detection runs on the rayon pool. Workers share `&RosterIndex` and
//! `&NicknameStore` read-only; each document is independent. Placeholder
//! numbers are then assigned on the calling thread in input order, so the
//! same batch always yields the same labels regardless of scheduling.
//!
//! Cancellation is cooperative: the flag is checked before each document,
//! and a cancelled batch returns [`EngineError::Cancelled`] with no
//! partial results.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use scrub_alias::CorrectionRecord;
use scrub_core::{BatchId, ConfidenceTier, RosterIndex};

use crate::error::EngineError;
use crate::orchestrator::{Analysis, Orchestrator};
use crate::placeholder::PlaceholderAllocator;
use crate::result::{Document, EvaluatorView, ReviewItem, ScrubResult};

/// Summary counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Documents scrubbed.
    pub documents: usize,
    /// Results per tier.
    pub confirmed: usize,
    /// Results per tier.
    pub probable: usize,
    /// Results per tier.
    pub unknown: usize,
    /// Results per resolution method name.
    pub methods: BTreeMap<String, usize>,
    /// Results that are not confirmed.
    pub needs_review: usize,
    /// Roster students with at least one resolved document.
    pub matched_students: usize,
    /// Canonical names of roster students with no resolved document.
    pub unmatched_students: Vec<String>,
}

impl BatchStats {
    /// Compute statistics for `results` against `roster`.
    pub fn compute(results: &[ScrubResult], roster: &RosterIndex) -> Self {
        let mut stats = Self {
            documents: results.len(),
            ..Self::default()
        };
        let mut matched = HashSet::new();
        for result in results {
            match result.confidence_tier {
                ConfidenceTier::Confirmed => stats.confirmed += 1,
                ConfidenceTier::Probable => stats.probable += 1,
                ConfidenceTier::Unknown => stats.unknown += 1,
            }
            *stats
                .methods
                .entry(result.method_used.as_str().to_string())
                .or_default() += 1;
            if result.needs_review() {
                stats.needs_review += 1;
            }
            if let Some(entry) = result.assigned_identity.entry() {
                matched.insert(entry);
            }
        }
        stats.matched_students = matched.len();
        stats.unmatched_students = roster
            .entries()
            .iter()
            .filter(|e| !matched.contains(e))
            .map(|e| e.canonical_full_name.clone())
            .collect();
        stats
    }
}

/// Results of one batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch identifier.
    pub batch_id: BatchId,
    /// One result per document.
    pub results: Vec<ScrubResult>,
    /// Summary counts.
    pub stats: BatchStats,
}

impl BatchReport {
    /// Evaluator projections of every result.
    pub fn evaluator_views(&self) -> Vec<EvaluatorView> {
        self.results.iter().map(ScrubResult::evaluator_view).collect()
    }

    /// Review items for every result that is not confirmed.
    pub fn review_queue(&self) -> Vec<ReviewItem> {
        self.results.iter().filter_map(ScrubResult::review_item).collect()
    }

    /// The result for `document_id`.
    pub fn result(&self, document_id: &str) -> Option<&ScrubResult> {
        self.results
            .iter()
            .find(|r| r.document_id.as_str() == document_id)
    }
}

/// Runs batches through an [`Orchestrator`].
pub struct BatchProcessor<'a> {
    orchestrator: &'a Orchestrator<'a>,
}

impl<'a> BatchProcessor<'a> {
    /// Processor over `orchestrator`.
    pub fn new(orchestrator: &'a Orchestrator<'a>) -> Self {
        Self { orchestrator }
    }

    /// Scrub every document.
    pub fn run(&self, documents: &[Document]) -> Result<BatchReport, EngineError> {
        self.run_with_cancel(documents, &AtomicBool::new(false))
    }

    /// Scrub every document, stopping early if `cancel` is set.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateDocument`] if two documents share an id,
    /// [`EngineError::Cancelled`] if `cancel` was observed.
    pub fn run_with_cancel(
        &self,
        documents: &[Document],
        cancel: &AtomicBool,
    ) -> Result<BatchReport, EngineError> {
        check_unique(documents)?;
        let batch_id = BatchId::new();
        let total = documents.len();
        tracing::info!(batch_id = %batch_id.as_uuid(), documents = total, "batch started");

        let completed = AtomicUsize::new(0);
        let analyses: Vec<Option<Result<Analysis, EngineError>>> = documents
            .par_iter()
            .map(|document| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let analysis = self.orchestrator.analyze(document);
                completed.fetch_add(1, Ordering::Relaxed);
                Some(analysis)
            })
            .collect();

        if cancel.load(Ordering::Relaxed) || analyses.iter().any(Option::is_none) {
            let completed = completed.load(Ordering::Relaxed);
            tracing::warn!(batch_id = %batch_id.as_uuid(), completed, total, "batch cancelled");
            return Err(EngineError::Cancelled { completed, total });
        }

        let mut placeholders = PlaceholderAllocator::new(
            self.orchestrator.config().redaction.placeholder_prefix.clone(),
        );
        let mut results = Vec::with_capacity(total);
        for analysis in analyses.into_iter().flatten() {
            results.push(analysis?.finish(&mut placeholders));
        }

        let stats = BatchStats::compute(&results, self.orchestrator.roster());
        tracing::info!(
            batch_id = %batch_id.as_uuid(),
            documents = stats.documents,
            confirmed = stats.confirmed,
            probable = stats.probable,
            unknown = stats.unknown,
            "batch finished"
        );
        Ok(BatchReport {
            batch_id,
            results,
            stats,
        })
    }

    /// Replace the results named by `corrections` with superseding
    /// results and recompute statistics. The original report is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownDocument`] if a correction names a document
    /// not in `documents` or not in `report`.
    pub fn supersede_all(
        &self,
        report: &BatchReport,
        documents: &[Document],
        corrections: &[CorrectionRecord],
    ) -> Result<BatchReport, EngineError> {
        let by_id: HashMap<&str, &Document> = documents
            .iter()
            .map(|d| (d.document_id.as_str(), d))
            .collect();
        let mut results = report.results.clone();
        for correction in corrections {
            let id = correction.document_id.as_str();
            let document = by_id
                .get(id)
                .ok_or_else(|| EngineError::UnknownDocument(id.to_string()))?;
            let slot = results
                .iter_mut()
                .find(|r| r.document_id.as_str() == id)
                .ok_or_else(|| EngineError::UnknownDocument(id.to_string()))?;
            *slot = self.orchestrator.supersede(document, correction)?;
        }
        let stats = BatchStats::compute(&results, self.orchestrator.roster());
        Ok(BatchReport {
            batch_id: report.batch_id,
            results,
            stats,
        })
    }
}

fn check_unique(documents: &[Document]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for document in documents {
        if !seen.insert(document.document_id.as_str()) {
            return Err(EngineError::DuplicateDocument(
                document.document_id.to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_alias::{AliasRegistry, NicknameStore};
    use scrub_core::{AliasPolicy, DocumentId, EngineConfig, ResolutionMethod, RosterRecord};
    use scrub_match::EditDistanceSoundex;

    fn roster() -> RosterIndex {
        RosterIndex::from_records(&[
            RosterRecord::with_id("Kate Bue", "S1"),
            RosterRecord::with_id("John Smith", "S2"),
            RosterRecord::with_id("Mary Jones", "S3"),
        ])
        .unwrap()
    }

    fn docs() -> Vec<Document> {
        [
            ("a", "Mystery Person\n\nbody"),
            ("b", "Name: John Smith\n\nJohn's essay."),
            ("c", "Kaitlyn Bue\n\nKaitlyn's essay."),
            ("d", ""),
        ]
        .iter()
        .map(|(id, text)| Document::new(DocumentId::new(*id).unwrap(), *text))
        .collect()
    }

    #[test]
    fn placeholders_follow_input_order() {
        let roster = roster();
        let store = NicknameStore::new();
        let config = EngineConfig::default();
        let orchestrator =
            Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();
        let processor = BatchProcessor::new(&orchestrator);

        for _ in 0..5 {
            let report = processor.run(&docs()).unwrap();
            let labels: Vec<_> = report
                .results
                .iter()
                .map(|r| r.assigned_identity.placeholder().map(|p| p.label.clone()))
                .collect();
            assert_eq!(
                labels,
                vec![
                    Some("Unknown Student 01".to_string()),
                    None,
                    Some("Unknown Student 02".to_string()),
                    Some("Unknown Student 03".to_string()),
                ]
            );
        }
    }

    #[test]
    fn stats_count_tiers_and_unmatched_students() {
        let roster = roster();
        let store = NicknameStore::new();
        let config = EngineConfig::default();
        let orchestrator =
            Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();
        let report = BatchProcessor::new(&orchestrator)
            .run(&docs())
            .unwrap();

        assert_eq!(report.stats.documents, 4);
        assert_eq!(report.stats.confirmed, 1);
        assert_eq!(report.stats.unknown, 3);
        assert_eq!(report.stats.needs_review, 3);
        assert_eq!(report.stats.matched_students, 1);
        assert_eq!(report.stats.unmatched_students, vec!["Kate Bue", "Mary Jones"]);
        assert_eq!(report.stats.methods.get("fallback"), Some(&3));
        assert_eq!(report.review_queue().len(), 3);
        assert_eq!(report.evaluator_views().len(), 4);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let roster = roster();
        let store = NicknameStore::new();
        let config = EngineConfig::default();
        let orchestrator =
            Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();
        let mut documents = docs();
        documents.push(documents[0].clone());
        let err = BatchProcessor::new(&orchestrator)
            .run(&documents)
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateDocument(id) if id == "a"));
    }

    #[test]
    fn cancelled_batch_returns_nothing() {
        let roster = roster();
        let store = NicknameStore::new();
        let config = EngineConfig::default();
        let orchestrator =
            Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();
        let cancel = AtomicBool::new(true);
        let err = BatchProcessor::new(&orchestrator)
            .run_with_cancel(&docs(), &cancel)
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled { completed: 0, total: 4 }));
    }

    #[test]
    fn supersede_all_replaces_only_corrected_results() {
        let roster = roster();
        let registry = AliasRegistry::in_memory(AliasPolicy::default());
        let config = EngineConfig::default();
        let documents = docs();

        let before = registry.snapshot();
        let orchestrator =
            Orchestrator::new(&roster, &before, &config, &EditDistanceSoundex).unwrap();
        let report = BatchProcessor::new(&orchestrator)
            .run(&documents)
            .unwrap();

        let kate = roster.entries()[0].clone();
        let record = registry
            .record_correction(&documents[2].document_id, &kate, "Kaitlyn Bue")
            .unwrap();
        let after = registry.snapshot();
        let orchestrator =
            Orchestrator::new(&roster, &after, &config, &EditDistanceSoundex).unwrap();
        let updated = BatchProcessor::new(&orchestrator)
            .supersede_all(&report, &documents, &[record])
            .unwrap();

        let c = updated.result("c").unwrap();
        assert_eq!(c.method_used, ResolutionMethod::Correction);
        assert_eq!(c.confidence_tier, ConfidenceTier::Confirmed);
        assert!(!c.redacted_text.contains("Kaitlyn"));
        assert_eq!(updated.result("a"), report.result("a"));
        assert_eq!(updated.stats.confirmed, 2);
        assert_eq!(updated.stats.unmatched_students, vec!["Mary Jones"]);
        assert_eq!(report.result("c").unwrap().method_used, ResolutionMethod::Fallback);
    }
}
