//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the engine.
//! A [`StudentId`] cannot be passed where a [`DocumentId`] is expected.
//!
//! String identifiers are supplied by external collaborators (the roster
//! loader, the ingestion pipeline) and are validated at construction:
//! they must be non-empty after trimming. [`BatchId`] is UUID-based and
//! always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Implements `Deserialize` for a validated string newtype by routing the
/// raw string through the type's `new()` constructor, so invalid values
/// are rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A student identifier from the roster (e.g. a district student number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StudentId(String);

impl_validating_deserialize!(StudentId);

impl StudentId {
    /// Create a student identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStudentId`] if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidStudentId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document identifier supplied by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(String);

impl_validating_deserialize!(DocumentId);

impl DocumentId {
    /// Create a document identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDocumentId`] if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidDocumentId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one processing batch. Placeholder sequence numbers are
/// scoped to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Create a new random batch identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a batch identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}
