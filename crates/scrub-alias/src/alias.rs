//! # Nickname Aliases
//!
//! A [`NicknameAlias`] states that `alias_token` is a known variant of a
//! canonical first name. Aliases are never deleted; an operator may
//! deprecate one, after which the matcher ignores it but the record (and
//! its history in the log) remains.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use scrub_core::{normalize_name, DocumentId, Timestamp};

/// Where an alias came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasSource {
    /// Built-in nickname table.
    Seeded,
    /// Promoted from a human-confirmed correction.
    Learned,
}

impl AliasSource {
    /// The canonical string name of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Learned => "learned",
        }
    }
}

impl std::fmt::Display for AliasSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the matcher may use an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AliasStatus {
    /// In use.
    Active,
    /// Flagged inactive by an operator.
    Deprecated {
        /// Operator-supplied reason.
        reason: String,
        /// When the alias was deprecated.
        at: Timestamp,
    },
}

/// A first-name variant known to correspond to a canonical first name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicknameAlias {
    /// Canonical first name as it appears on the roster.
    pub canonical_first: String,
    /// The variant as first written on a document or in the seed table.
    pub alias_token: String,
    /// Seeded or learned.
    pub source: AliasSource,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Active or deprecated.
    pub status: AliasStatus,
    /// Documents whose corrections confirmed this alias. A document
    /// contributes at most one confidence increase.
    pub confirmations: BTreeSet<DocumentId>,
}

impl NicknameAlias {
    /// Whether the matcher may use this alias.
    pub fn is_active(&self) -> bool {
        matches!(self.status, AliasStatus::Active)
    }

    /// Normalized canonical first name (the store key).
    pub fn canonical_key(&self) -> String {
        normalize_name(&self.canonical_first)
    }

    /// Normalized alias token.
    pub fn alias_key(&self) -> String {
        normalize_name(&self.alias_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias() -> NicknameAlias {
        NicknameAlias {
            canonical_first: "Kate".to_string(),
            alias_token: "Kaitlyn".to_string(),
            source: AliasSource::Learned,
            confidence: 0.85,
            status: AliasStatus::Active,
            confirmations: BTreeSet::new(),
        }
    }

    #[test]
    fn keys_are_normalized() {
        let a = NicknameAlias {
            alias_token: "KAITLYN.".to_string(),
            ..alias()
        };
        assert_eq!(a.canonical_key(), "kate");
        assert_eq!(a.alias_key(), "kaitlyn");
    }

    #[test]
    fn deprecated_alias_is_inactive() {
        let mut a = alias();
        assert!(a.is_active());
        a.status = AliasStatus::Deprecated {
            reason: "wrong student".to_string(),
            at: Timestamp::now(),
        };
        assert!(!a.is_active());
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(AliasStatus::Active).unwrap();
        assert_eq!(json["state"], "active");
    }
}
