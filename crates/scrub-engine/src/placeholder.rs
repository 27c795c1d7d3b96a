//! Placeholder identities for documents whose student could not be
//! resolved. Numbers are batch-scoped and never reused within a batch.

use serde::{Deserialize, Serialize};

/// A stand-in identity, e.g. `Unknown Student 03`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderIdentity {
    /// One-based sequence number within the batch.
    pub sequence_number: u32,
    /// Display label.
    pub label: String,
}

/// Hands out placeholder identities in order.
#[derive(Debug, Clone)]
pub struct PlaceholderAllocator {
    prefix: String,
    issued: u32,
}

impl PlaceholderAllocator {
    /// Allocator whose labels start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    /// The next placeholder.
    pub fn allocate(&mut self) -> PlaceholderIdentity {
        self.issued += 1;
        PlaceholderIdentity {
            sequence_number: self.issued,
            label: format!("{} {:02}", self.prefix, self.issued),
        }
    }

    /// How many placeholders were issued.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_zero_padded_and_sequential() {
        let mut alloc = PlaceholderAllocator::new("Unknown Student");
        assert_eq!(alloc.allocate().label, "Unknown Student 01");
        let second = alloc.allocate();
        assert_eq!(second.sequence_number, 2);
        assert_eq!(second.label, "Unknown Student 02");
        assert_eq!(alloc.issued(), 2);
    }

    #[test]
    fn numbers_past_ninety_nine_widen() {
        let mut alloc = PlaceholderAllocator::new("Unknown Student");
        let last = (0..100).map(|_| alloc.allocate()).last().unwrap();
        assert_eq!(last.label, "Unknown Student 100");
    }
}
