//! Batch-level properties that must hold for any roster order, any essay
//! body and any learned alias confidence in range.

use std::sync::atomic::AtomicBool;

use proptest::prelude::*;

use scrub_alias::{AliasEvent, AliasLog, AliasRegistry, NicknameStore};
use scrub_core::{
    AliasPolicy, ConfidenceTier, DocumentId, EngineConfig, RosterIndex, RosterRecord,
};
use scrub_engine::{BatchProcessor, BatchReport, Document, EngineError, Orchestrator};
use scrub_match::EditDistanceSoundex;

fn records() -> Vec<RosterRecord> {
    vec![
        RosterRecord::with_id("John Smith", "S1"),
        RosterRecord::with_id("Jon Smith", "S2"),
        RosterRecord::with_id("Kate Bue", "S3"),
        RosterRecord::with_id("Chris Lee", "S4"),
        RosterRecord::with_id("Chris Li", "S5"),
        RosterRecord::with_id("Maria Garcia", "S6"),
    ]
}

fn batch() -> Vec<Document> {
    [
        ("e1", "Name: John Smith\n\nThe river was cold."),
        ("e2", "Kate Bue\n\nA short poem."),
        ("e3", "Chris Le\n\nNotes."),
        ("e4", "Jonn Smith\n\nDraft."),
        ("e5", "Kaitlyn Bue\n\nSummer."),
        ("e6", "Student ID: S6\n\nmaria garcia wrote this"),
        ("e7", ""),
    ]
    .iter()
    .map(|(id, text)| Document::new(DocumentId::new(*id).unwrap(), *text))
    .collect()
}

fn run(roster: &RosterIndex, store: &NicknameStore, docs: &[Document]) -> BatchReport {
    let config = EngineConfig::default();
    let orchestrator = Orchestrator::new(roster, store, &config, &EditDistanceSoundex).unwrap();
    BatchProcessor::new(&orchestrator).run(docs).unwrap()
}

/// Tier, student id and placeholder label per document.
fn outcome(report: &BatchReport) -> Vec<(ConfidenceTier, Option<String>, Option<String>)> {
    report
        .results
        .iter()
        .map(|r| {
            (
                r.confidence_tier,
                r.assigned_identity
                    .entry()
                    .and_then(|e| e.student_id.as_ref())
                    .map(|id| id.to_string()),
                r.assigned_identity.placeholder().map(|p| p.label.clone()),
            )
        })
        .collect()
}

fn body_word() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "the", "river", "was", "cold", "and", "we", "walked", "home", "after", "school",
        "my", "brother", "said", "nothing", "about", "it",
    ])
}

fn body() -> impl Strategy<Value = String> {
    prop::collection::vec(body_word(), 0..30).prop_map(|w| w.join(" "))
}

#[test]
fn repeated_runs_assign_identical_placeholders() {
    let roster = RosterIndex::from_records(&records()).unwrap();
    let store = NicknameStore::new();
    let docs = batch();
    let first = run(&roster, &store, &docs);
    let second = run(&roster, &store, &docs);
    assert_eq!(outcome(&first), outcome(&second));

    let labels: Vec<_> = first
        .results
        .iter()
        .filter_map(|r| r.assigned_identity.placeholder())
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["Unknown Student 01", "Unknown Student 02", "Unknown Student 03", "Unknown Student 04"]
    );
}

#[test]
fn cancelled_batch_returns_no_partial_results() {
    let roster = RosterIndex::from_records(&records()).unwrap();
    let store = NicknameStore::new();
    let config = EngineConfig::default();
    let orchestrator = Orchestrator::new(&roster, &store, &config, &EditDistanceSoundex).unwrap();
    let err = BatchProcessor::new(&orchestrator)
        .run_with_cancel(&batch(), &AtomicBool::new(true))
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled { total: 7, .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Shuffling the roster never changes any document's outcome.
    #[test]
    fn outcome_is_independent_of_roster_order(
        shuffled in Just(records()).prop_shuffle()
    ) {
        let store = NicknameStore::new();
        let docs = batch();
        let baseline = run(&RosterIndex::from_records(&records()).unwrap(), &store, &docs);
        let permuted = run(&RosterIndex::from_records(&shuffled).unwrap(), &store, &docs);
        prop_assert_eq!(outcome(&baseline), outcome(&permuted));
    }

    /// A labeled roster name is confirmed, removed, and a second pass over
    /// the output changes nothing.
    #[test]
    fn labeled_names_are_removed_and_rescrubbing_is_stable(
        index in 0usize..6,
        before in body(),
        after in body(),
    ) {
        let roster = RosterIndex::from_records(&records()).unwrap();
        let store = NicknameStore::new();
        let entry = roster.entries()[index].clone();
        let text = format!(
            "Name: {}\n\n{before} {} {after}",
            entry.canonical_full_name, entry.canonical_first
        );
        let doc = Document::new(DocumentId::new("e").unwrap(), text);

        let first = run(&roster, &store, std::slice::from_ref(&doc));
        let result = &first.results[0];
        prop_assert_eq!(result.confidence_tier, ConfidenceTier::Confirmed);
        prop_assert_eq!(result.assigned_identity.entry(), Some(&entry));
        let lower = result.redacted_text.to_lowercase();
        for word in lower.split(|c: char| !c.is_alphanumeric()) {
            prop_assert_ne!(word, entry.canonical_first.to_lowercase());
            prop_assert_ne!(word, entry.canonical_last.to_lowercase());
        }

        let again = Document::new(DocumentId::new("e").unwrap(), result.redacted_text.clone());
        let second = run(&roster, &store, std::slice::from_ref(&again));
        prop_assert_eq!(&second.results[0].redacted_text, &result.redacted_text);
    }

    /// A learned alias at or above the alias floor resolves its student.
    #[test]
    fn learned_alias_above_floor_resolves(confidence in 0.85f64..=0.98) {
        let roster = RosterIndex::from_records(&records()).unwrap();
        let mut log = AliasLog::in_memory();
        log.append(vec![AliasEvent::AliasLearned {
            canonical_first: "Kate".to_string(),
            alias_token: "Kaitlyn".to_string(),
            confidence,
            document_id: DocumentId::new("seed-doc").unwrap(),
        }])
        .unwrap();
        let registry = AliasRegistry::from_log(log, AliasPolicy::default());
        let store = registry.snapshot();

        let doc = Document::new(DocumentId::new("e").unwrap(), "Kaitlyn Bue\n\nSummer.");
        let report = run(&roster, &store, &[doc]);
        let result = &report.results[0];
        prop_assert!(result.confidence_tier.is_resolved());
        prop_assert_eq!(
            result.assigned_identity.entry().map(|e| e.canonical_full_name.as_str()),
            Some("Kate Bue")
        );
        prop_assert!(!result.redacted_text.contains("Kaitlyn"));
    }
}
