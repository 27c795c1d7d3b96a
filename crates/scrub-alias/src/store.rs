//! # Nickname Equivalence Store
//!
//! Current alias state, derived by folding the alias log. Keys are
//! normalized: canonical first name, then alias token. A store value is
//! immutable once published by the registry; detection threads read it
//! through an `Arc` snapshot while corrections build the next one.

use std::collections::{BTreeMap, BTreeSet};

use scrub_core::normalize_name;

use crate::alias::{AliasSource, AliasStatus, NicknameAlias};
use crate::correction::CorrectionRecord;
use crate::log::{AliasEvent, LogEntry};

/// Alias state at some point in the log.
#[derive(Debug, Clone, Default)]
pub struct NicknameStore {
    aliases: BTreeMap<String, BTreeMap<String, NicknameAlias>>,
    corrections: Vec<CorrectionRecord>,
    applied: usize,
}

impl NicknameStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a sequence of log entries into a store.
    pub fn replay(entries: &[LogEntry]) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.apply(entry);
        }
        store
    }

    /// Apply one log entry.
    ///
    /// Events referring to aliases that do not exist, or re-adding one that
    /// does, leave the store unchanged.
    pub fn apply(&mut self, entry: &LogEntry) {
        self.applied += 1;
        match &entry.event {
            AliasEvent::AliasSeeded {
                canonical_first,
                alias_token,
                confidence,
            } => self.insert(canonical_first, alias_token, AliasSource::Seeded, *confidence, None),
            AliasEvent::AliasLearned {
                canonical_first,
                alias_token,
                confidence,
                document_id,
            } => self.insert(
                canonical_first,
                alias_token,
                AliasSource::Learned,
                *confidence,
                Some(document_id.clone()),
            ),
            AliasEvent::ConfidenceRaised {
                canonical_first,
                alias_token,
                confidence,
                document_id,
            } => {
                if let Some(alias) = self.get_mut(canonical_first, alias_token) {
                    alias.confidence = *confidence;
                    alias.confirmations.insert(document_id.clone());
                }
            }
            AliasEvent::AliasDeprecated {
                canonical_first,
                alias_token,
                reason,
            } => {
                if let Some(alias) = self.get_mut(canonical_first, alias_token) {
                    alias.status = AliasStatus::Deprecated {
                        reason: reason.clone(),
                        at: entry.recorded_at,
                    };
                }
            }
            AliasEvent::CorrectionRecorded { record } => self.corrections.push(record.clone()),
        }
    }

    fn insert(
        &mut self,
        canonical_first: &str,
        alias_token: &str,
        source: AliasSource,
        confidence: f64,
        confirmed_by: Option<scrub_core::DocumentId>,
    ) {
        let slot = self
            .aliases
            .entry(normalize_name(canonical_first))
            .or_default();
        slot.entry(normalize_name(alias_token)).or_insert_with(|| NicknameAlias {
            canonical_first: canonical_first.to_string(),
            alias_token: alias_token.to_string(),
            source,
            confidence,
            status: AliasStatus::Active,
            confirmations: confirmed_by.into_iter().collect::<BTreeSet<_>>(),
        });
    }

    fn get_mut(&mut self, canonical_first: &str, alias_token: &str) -> Option<&mut NicknameAlias> {
        self.aliases
            .get_mut(&normalize_name(canonical_first))?
            .get_mut(&normalize_name(alias_token))
    }

    /// The alias `alias_token` of `canonical_first`, in any status.
    pub fn get(&self, canonical_first: &str, alias_token: &str) -> Option<&NicknameAlias> {
        self.aliases
            .get(&normalize_name(canonical_first))?
            .get(&normalize_name(alias_token))
    }

    /// Every alias recorded for `canonical_first`, deprecated ones included.
    pub fn aliases_for(&self, canonical_first: &str) -> impl Iterator<Item = &NicknameAlias> {
        self.aliases
            .get(&normalize_name(canonical_first))
            .into_iter()
            .flat_map(|m| m.values())
    }

    /// Active aliases of `canonical_first`.
    pub fn active_aliases(&self, canonical_first: &str) -> Vec<&NicknameAlias> {
        self.aliases_for(canonical_first)
            .filter(|a| a.is_active())
            .collect()
    }

    /// The active alias linking `token` to `canonical_first`, if its
    /// confidence is at least `min_confidence`.
    pub fn matching_alias(
        &self,
        canonical_first: &str,
        token: &str,
        min_confidence: f64,
    ) -> Option<&NicknameAlias> {
        self.get(canonical_first, token)
            .filter(|a| a.is_active() && a.confidence >= min_confidence)
    }

    /// All aliases, ordered by canonical first name then alias token.
    pub fn iter(&self) -> impl Iterator<Item = &NicknameAlias> {
        self.aliases.values().flat_map(|m| m.values())
    }

    /// Number of aliases in any status.
    pub fn len(&self) -> usize {
        self.aliases.values().map(BTreeMap::len).sum()
    }

    /// Whether no aliases are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Accepted corrections in log order.
    pub fn corrections(&self) -> &[CorrectionRecord] {
        &self.corrections
    }

    /// Number of log entries folded into this store.
    pub fn applied_entries(&self) -> usize {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::AliasLog;
    use scrub_core::DocumentId;

    fn doc(id: &str) -> DocumentId {
        DocumentId::new(id).unwrap()
    }

    fn build(events: Vec<AliasEvent>) -> NicknameStore {
        let mut log = AliasLog::in_memory();
        log.append(events).unwrap();
        NicknameStore::replay(log.entries())
    }

    #[test]
    fn learned_alias_is_keyed_by_normalized_names() {
        let store = build(vec![AliasEvent::AliasLearned {
            canonical_first: "Kate".to_string(),
            alias_token: "Kaitlyn".to_string(),
            confidence: 0.85,
            document_id: doc("d1"),
        }]);
        let alias = store.get("KATE", "kaitlyn").unwrap();
        assert_eq!(alias.source, AliasSource::Learned);
        assert!(alias.confirmations.contains(&doc("d1")));
        assert!(store.matching_alias("Kate", "Kaitlyn", 0.85).is_some());
        assert!(store.matching_alias("Kate", "Kaitlyn", 0.9).is_none());
    }

    #[test]
    fn confidence_raised_updates_value_and_confirmations() {
        let store = build(vec![
            AliasEvent::AliasLearned {
                canonical_first: "Kate".to_string(),
                alias_token: "Kaitlyn".to_string(),
                confidence: 0.85,
                document_id: doc("d1"),
            },
            AliasEvent::ConfidenceRaised {
                canonical_first: "Kate".to_string(),
                alias_token: "Kaitlyn".to_string(),
                confidence: 0.88,
                document_id: doc("d2"),
            },
        ]);
        let alias = store.get("Kate", "Kaitlyn").unwrap();
        assert_eq!(alias.confidence, 0.88);
        assert_eq!(alias.confirmations.len(), 2);
    }

    #[test]
    fn deprecated_alias_is_kept_but_not_matched() {
        let store = build(vec![
            AliasEvent::AliasSeeded {
                canonical_first: "William".to_string(),
                alias_token: "Bill".to_string(),
                confidence: 0.9,
            },
            AliasEvent::AliasDeprecated {
                canonical_first: "William".to_string(),
                alias_token: "Bill".to_string(),
                reason: "ambiguous in this school".to_string(),
            },
        ]);
        assert_eq!(store.len(), 1);
        assert!(store.active_aliases("William").is_empty());
        assert!(store.matching_alias("William", "Bill", 0.0).is_none());
        assert!(store.get("William", "Bill").is_some());
    }

    #[test]
    fn duplicate_seed_does_not_overwrite() {
        let store = build(vec![
            AliasEvent::AliasSeeded {
                canonical_first: "William".to_string(),
                alias_token: "Bill".to_string(),
                confidence: 0.9,
            },
            AliasEvent::AliasSeeded {
                canonical_first: "William".to_string(),
                alias_token: "BILL".to_string(),
                confidence: 0.1,
            },
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("William", "Bill").unwrap().confidence, 0.9);
    }

    #[test]
    fn raise_on_missing_alias_is_ignored() {
        let store = build(vec![AliasEvent::ConfidenceRaised {
            canonical_first: "Kate".to_string(),
            alias_token: "Kat".to_string(),
            confidence: 0.9,
            document_id: doc("d1"),
        }]);
        assert!(store.is_empty());
        assert_eq!(store.applied_entries(), 1);
    }
}
