//! # Engine Configuration
//!
//! Every threshold the detectors and the orchestrator consult lives here,
//! so the values can be calibrated against real roster and document samples
//! without a rebuild. All fields default; a YAML file only needs to name
//! what it overrides:
//!
//! ```yaml
//! matching:
//!   similarity_threshold: 0.85
//! redaction:
//!   marker: "[STUDENT]"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Header-window scanning.
    pub detection: DetectionConfig,
    /// Candidate scoring and selection.
    pub matching: MatchingConfig,
    /// Redaction output.
    pub redaction: RedactionConfig,
    /// Learned alias confidence policy.
    pub aliases: AliasPolicy,
}

/// Header-window scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Number of leading lines scanned for identity fields.
    pub header_window_lines: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            header_window_lines: 10,
        }
    }
}

/// Candidate scoring and selection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum confidence for a fuzzy selection.
    pub confidence_floor: f64,
    /// Any runner-up within this margin of the best score makes the
    /// match ambiguous.
    pub tie_margin: f64,
    /// Minimum edit-distance ratio for a similarity match.
    pub similarity_threshold: f64,
    /// Upper bound on confidence from similarity alone.
    pub similarity_cap: f64,
    /// Confidence of an exact first- and last-name match.
    pub exact_confidence: f64,
    /// Aliases below this confidence are ignored during matching.
    pub alias_min_confidence: f64,
    /// Confidence at or above which a resolution is `confirmed`.
    pub confirm_threshold: f64,
    /// Confidence of a unique roster-prefix match.
    pub prefix_confidence: f64,
    /// Confidence when the first name matches exactly and the last name
    /// is only a close variant of the roster's.
    pub surname_variant_confidence: f64,
    /// Confidence of an unlabeled MLA-style header resolving to one entry.
    pub mla_confidence: f64,
    /// Confidence of a labeled name that resolves to several entries.
    pub ambiguous_label_confidence: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.6,
            tie_margin: 0.1,
            similarity_threshold: 0.82,
            similarity_cap: 0.75,
            exact_confidence: 0.95,
            alias_min_confidence: 0.85,
            confirm_threshold: 0.9,
            prefix_confidence: 0.9,
            surname_variant_confidence: 0.7,
            mla_confidence: 0.8,
            ambiguous_label_confidence: 0.7,
        }
    }
}

/// Redaction output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Replacement text for every redacted occurrence.
    pub marker: String,
    /// Label prefix for placeholder identities.
    pub placeholder_prefix: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            marker: "[REDACTED]".to_string(),
            placeholder_prefix: "Unknown Student".to_string(),
        }
    }
}

/// Confidence policy for nickname aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasPolicy {
    /// Confidence of a newly learned alias.
    pub initial_confidence: f64,
    /// Increase applied when another document confirms the alias.
    pub confidence_step: f64,
    /// Learned aliases never exceed this confidence.
    pub confidence_ceiling: f64,
    /// Confidence of built-in seed aliases. Kept below
    /// `matching.confirm_threshold` so a table-only nickname is reviewed.
    pub seeded_confidence: f64,
}

impl Default for AliasPolicy {
    fn default() -> Self {
        Self {
            initial_confidence: 0.85,
            confidence_step: 0.03,
            confidence_ceiling: 0.98,
            seeded_confidence: 0.88,
        }
    }
}

impl EngineConfig {
    /// Load and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// YAML, or fails [`EngineConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detection.header_window_lines == 0 {
            return Err(ConfigError::Invalid {
                field: "detection.header_window_lines",
                reason: "must scan at least one line".to_string(),
            });
        }

        let m = &self.matching;
        let a = &self.aliases;
        let unit_fields = [
            ("matching.confidence_floor", m.confidence_floor),
            ("matching.tie_margin", m.tie_margin),
            ("matching.similarity_threshold", m.similarity_threshold),
            ("matching.similarity_cap", m.similarity_cap),
            ("matching.exact_confidence", m.exact_confidence),
            ("matching.alias_min_confidence", m.alias_min_confidence),
            ("matching.confirm_threshold", m.confirm_threshold),
            ("matching.prefix_confidence", m.prefix_confidence),
            ("matching.surname_variant_confidence", m.surname_variant_confidence),
            ("matching.mla_confidence", m.mla_confidence),
            ("matching.ambiguous_label_confidence", m.ambiguous_label_confidence),
            ("aliases.initial_confidence", a.initial_confidence),
            ("aliases.confidence_step", a.confidence_step),
            ("aliases.confidence_ceiling", a.confidence_ceiling),
            ("aliases.seeded_confidence", a.seeded_confidence),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }

        if a.initial_confidence > a.confidence_ceiling {
            return Err(ConfigError::Invalid {
                field: "aliases.initial_confidence",
                reason: "must not exceed aliases.confidence_ceiling".to_string(),
            });
        }
        if a.seeded_confidence >= m.confirm_threshold {
            return Err(ConfigError::Invalid {
                field: "aliases.seeded_confidence",
                reason: "a built-in nickname alone must never confirm an identity".to_string(),
            });
        }
        if m.similarity_cap >= m.confirm_threshold {
            return Err(ConfigError::Invalid {
                field: "matching.similarity_cap",
                reason: "similarity alone must never confirm an identity".to_string(),
            });
        }

        let marker = self.redaction.marker.trim();
        if marker.is_empty() {
            return Err(ConfigError::Invalid {
                field: "redaction.marker",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
