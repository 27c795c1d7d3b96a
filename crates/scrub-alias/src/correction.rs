//! # Correction Feedback Recorder
//!
//! Turns a human-confirmed correction ("document D is really roster entry
//! E; the name was written as N") into nickname knowledge.
//!
//! The as-written last name must agree with the roster's. Only first-name
//! variants are ever learned; a correction that implies a different family
//! name is rejected and changes nothing.
//!
//! [`plan_correction`] is pure: it inspects a store snapshot and returns
//! the events to append. [`AliasRegistry`](crate::AliasRegistry) runs it
//! under the writer lock and commits the result.

use serde::{Deserialize, Serialize};

use scrub_core::{
    normalize_name, split_full_name, AliasPolicy, CorrectionError, DocumentId, RosterEntry,
    Timestamp,
};

use crate::log::AliasEvent;
use crate::store::NicknameStore;

/// What a correction did to the nickname store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum AliasEffect {
    /// The as-written first name equals the canonical one.
    NoAlias,
    /// A new learned alias was created.
    Learned {
        /// The new alias token.
        alias_token: String,
        /// Its initial confidence.
        confidence: f64,
    },
    /// An existing alias gained a confirmation.
    ConfidenceRaised {
        /// The alias token.
        alias_token: String,
        /// Confidence before.
        from: f64,
        /// Confidence after.
        to: f64,
    },
    /// This document had already confirmed the alias.
    AlreadyConfirmed {
        /// The alias token.
        alias_token: String,
    },
    /// The alias exists but is deprecated; corrections do not revive it.
    Deprecated {
        /// The alias token.
        alias_token: String,
    },
}

/// An accepted reviewer correction. Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// The corrected document.
    pub document_id: DocumentId,
    /// The roster entry the reviewer confirmed.
    pub roster_entry: RosterEntry,
    /// The student's name as written on the document.
    pub as_written_name: String,
    /// When the correction was accepted.
    pub timestamp: Timestamp,
    /// Resulting change to the nickname store.
    pub alias_effect: AliasEffect,
}

/// A validated correction and the log events that realise it.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionPlan {
    /// The record to retain.
    pub record: CorrectionRecord,
    /// Events to append, the `CorrectionRecorded` event last.
    pub events: Vec<AliasEvent>,
}

/// Validate a correction against `store` and plan its effect.
///
/// # Errors
///
/// [`CorrectionError::UnparseableName`] if `as_written_name` lacks a first
/// or last part; [`CorrectionError::InconsistentLastName`] if its last name
/// disagrees with `roster_entry`.
pub fn plan_correction(
    store: &NicknameStore,
    policy: &AliasPolicy,
    document_id: &DocumentId,
    roster_entry: &RosterEntry,
    as_written_name: &str,
    timestamp: Timestamp,
) -> Result<CorrectionPlan, CorrectionError> {
    let (written_first, written_last) = split_against(as_written_name, &roster_entry.canonical_last)
        .ok_or_else(|| CorrectionError::UnparseableName(as_written_name.to_string()))?;

    if normalize_name(&written_last) != roster_entry.normalized_last() {
        return Err(CorrectionError::InconsistentLastName {
            as_written_last: written_last,
            canonical_last: roster_entry.canonical_last.clone(),
        });
    }

    let canonical_first = &roster_entry.canonical_first;
    let mut events = Vec::with_capacity(2);
    let alias_effect = if normalize_name(&written_first) == roster_entry.normalized_first() {
        AliasEffect::NoAlias
    } else {
        match store.get(canonical_first, &written_first) {
            None => {
                events.push(AliasEvent::AliasLearned {
                    canonical_first: canonical_first.clone(),
                    alias_token: written_first.clone(),
                    confidence: policy.initial_confidence,
                    document_id: document_id.clone(),
                });
                AliasEffect::Learned {
                    alias_token: written_first,
                    confidence: policy.initial_confidence,
                }
            }
            Some(alias) if !alias.is_active() => AliasEffect::Deprecated {
                alias_token: alias.alias_token.clone(),
            },
            Some(alias) if alias.confirmations.contains(document_id) => {
                AliasEffect::AlreadyConfirmed {
                    alias_token: alias.alias_token.clone(),
                }
            }
            Some(alias) => {
                let to = raised_confidence(alias.confidence, policy);
                events.push(AliasEvent::ConfidenceRaised {
                    canonical_first: alias.canonical_first.clone(),
                    alias_token: alias.alias_token.clone(),
                    confidence: to,
                    document_id: document_id.clone(),
                });
                AliasEffect::ConfidenceRaised {
                    alias_token: alias.alias_token.clone(),
                    from: alias.confidence,
                    to,
                }
            }
        }
    };

    let record = CorrectionRecord {
        document_id: document_id.clone(),
        roster_entry: roster_entry.clone(),
        as_written_name: as_written_name.trim().to_string(),
        timestamp,
        alias_effect,
    };
    events.push(AliasEvent::CorrectionRecorded {
        record: record.clone(),
    });
    Ok(CorrectionPlan { record, events })
}

/// Confidence after one more confirming document: one step up, never past
/// the ceiling, never down.
pub fn raised_confidence(current: f64, policy: &AliasPolicy) -> f64 {
    (current + policy.confidence_step)
        .min(policy.confidence_ceiling)
        .max(current)
}

/// Split an as-written name into first and last, preferring a split whose
/// last part has as many words as the roster's last name.
fn split_against(as_written: &str, canonical_last: &str) -> Option<(String, String)> {
    if as_written.contains(',') {
        return split_full_name(as_written);
    }
    let words: Vec<&str> = as_written.split_whitespace().collect();
    let last_words = canonical_last.split_whitespace().count().max(1);
    if last_words > 1 && words.len() > last_words {
        let (first, last) = words.split_at(words.len() - last_words);
        return Some((first.join(" "), last.join(" ")));
    }
    split_full_name(as_written)
}
