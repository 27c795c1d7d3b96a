//! # Roster Index
//!
//! In-memory lookup structure over a roster snapshot. Built once per batch
//! and read-only afterwards, so it can be shared across worker threads by
//! plain reference.
//!
//! Lookups are keyed by normalized text (see [`normalize_name`]):
//!
//! - by last name, for fuzzy candidate generation;
//! - by first name;
//! - by full name, in `first last`, `last first` and `last, first` order;
//! - by student id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::identity::StudentId;
use crate::normalize::{normalize_name, split_full_name};

/// One row of the roster snapshot as handed over by the external loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Full name as recorded by the school.
    pub full_name: String,
    /// Optional district or school student number.
    #[serde(default)]
    pub student_id: Option<String>,
}

impl RosterRecord {
    /// Convenience constructor for a record without a student id.
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            student_id: None,
        }
    }

    /// Convenience constructor for a record with a student id.
    pub fn with_id(full_name: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            student_id: Some(student_id.into()),
        }
    }
}

/// A canonical roster entry. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Unique student identifier, when the roster carries one.
    pub student_id: Option<StudentId>,
    /// Full name in `First Last` order.
    pub canonical_full_name: String,
    /// Given name(s).
    pub canonical_first: String,
    /// Family name.
    pub canonical_last: String,
}

impl RosterEntry {
    /// Build an entry from first and last name parts.
    pub fn new(
        canonical_first: impl Into<String>,
        canonical_last: impl Into<String>,
        student_id: Option<StudentId>,
    ) -> Self {
        let canonical_first = canonical_first.into();
        let canonical_last = canonical_last.into();
        Self {
            student_id,
            canonical_full_name: format!("{canonical_first} {canonical_last}"),
            canonical_first,
            canonical_last,
        }
    }

    /// Normalized first name.
    pub fn normalized_first(&self) -> String {
        normalize_name(&self.canonical_first)
    }

    /// Normalized last name.
    pub fn normalized_last(&self) -> String {
        normalize_name(&self.canonical_last)
    }

    /// Normalized full name in `first last` order.
    pub fn normalized_full(&self) -> String {
        normalize_name(&self.canonical_full_name)
    }

    /// Normalized full-name orderings a document might use: `first last`
    /// and `last first` (comma stripped by normalization).
    pub fn normalized_orderings(&self) -> [String; 2] {
        let first = self.normalized_first();
        let last = self.normalized_last();
        [format!("{first} {last}"), format!("{last} {first}")]
    }
}

/// Read-only index over the roster snapshot.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    entries: Vec<RosterEntry>,
    by_last: HashMap<String, Vec<usize>>,
    by_first: HashMap<String, Vec<usize>>,
    by_full: HashMap<String, Vec<usize>>,
    by_id: HashMap<StudentId, usize>,
}

impl RosterIndex {
    /// Build the index from parsed entries.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::DuplicateStudentId`] if two entries share a
    /// student id.
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, RosterError> {
        let mut index = Self {
            entries: Vec::with_capacity(entries.len()),
            ..Self::default()
        };
        for entry in entries {
            index.insert(entry)?;
        }
        tracing::debug!(entries = index.entries.len(), "roster index built");
        Ok(index)
    }

    /// Parse loader records into entries and build the index.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnparseableName`] for a single-token name,
    /// [`RosterError::InvalidId`] for a blank id and
    /// [`RosterError::DuplicateStudentId`] for a repeated id.
    pub fn from_records(records: &[RosterRecord]) -> Result<Self, RosterError> {
        let mut entries = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let (first, last) =
                split_full_name(&record.full_name).ok_or_else(|| RosterError::UnparseableName {
                    row,
                    full_name: record.full_name.clone(),
                })?;
            let student_id = record
                .student_id
                .as_deref()
                .map(StudentId::new)
                .transpose()
                .map_err(|source| RosterError::InvalidId { row, source })?;
            entries.push(RosterEntry::new(first, last, student_id));
        }
        Self::new(entries)
    }

    fn insert(&mut self, entry: RosterEntry) -> Result<(), RosterError> {
        let pos = self.entries.len();
        if let Some(id) = &entry.student_id {
            if let Some(&existing) = self.by_id.get(id) {
                return Err(RosterError::DuplicateStudentId {
                    student_id: id.to_string(),
                    first_row: existing,
                    second_row: pos,
                });
            }
            self.by_id.insert(id.clone(), pos);
        }
        self.by_last.entry(entry.normalized_last()).or_default().push(pos);
        self.by_first.entry(entry.normalized_first()).or_default().push(pos);
        for key in entry.normalized_orderings() {
            let slots = self.by_full.entry(key).or_default();
            if !slots.contains(&pos) {
                slots.push(pos);
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// All entries in roster order.
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose last name normalizes to the same text as `last`.
    pub fn lookup_last(&self, last: &str) -> Vec<&RosterEntry> {
        self.resolve(self.by_last.get(&normalize_name(last)))
    }

    /// Entries whose first name normalizes to the same text as `first`.
    pub fn lookup_first(&self, first: &str) -> Vec<&RosterEntry> {
        self.resolve(self.by_first.get(&normalize_name(first)))
    }

    /// Entries whose full name matches `full_name` in any supported order.
    pub fn lookup_full(&self, full_name: &str) -> Vec<&RosterEntry> {
        self.resolve(self.by_full.get(&normalize_name(full_name)))
    }

    /// The entry carrying `id`, if any.
    pub fn lookup_id(&self, id: &str) -> Option<&RosterEntry> {
        let id = StudentId::new(id).ok()?;
        self.by_id.get(&id).map(|&pos| &self.entries[pos])
    }

    /// Iterate over every distinct normalized last name with its entries.
    pub fn last_names(&self) -> impl Iterator<Item = (&str, Vec<&RosterEntry>)> {
        self.by_last
            .iter()
            .map(|(k, slots)| (k.as_str(), slots.iter().map(|&p| &self.entries[p]).collect()))
    }

    fn resolve(&self, slots: Option<&Vec<usize>>) -> Vec<&RosterEntry> {
        slots
            .map(|s| s.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }
}
