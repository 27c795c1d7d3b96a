//! Engine errors. Detection uncertainty is never an error; these cover
//! malformed batches, cancellation and redaction pattern failures.

use thiserror::Error;

/// Errors from the scrubbing orchestrator and batch processor.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The redaction pattern could not be compiled.
    #[error("redaction pattern error: {0}")]
    Redaction(#[from] regex::Error),

    /// The batch was cancelled; no results are returned.
    #[error("batch cancelled after {completed} of {total} documents")]
    Cancelled {
        /// Documents finished before cancellation was observed.
        completed: usize,
        /// Documents in the batch.
        total: usize,
    },

    /// Two documents in one batch share an id.
    #[error("duplicate document id {0:?} in batch")]
    DuplicateDocument(String),

    /// A correction was applied to the wrong document.
    #[error("correction for {correction:?} applied to document {document:?}")]
    DocumentMismatch {
        /// Document the correction names.
        correction: String,
        /// Document it was applied to.
        document: String,
    },

    /// A correction names a document that is not in the batch.
    #[error("document {0:?} is not part of this batch")]
    UnknownDocument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_display() {
        let err = EngineError::Cancelled {
            completed: 3,
            total: 10,
        };
        assert_eq!(err.to_string(), "batch cancelled after 3 of 10 documents");
    }

    #[test]
    fn regex_error_converts() {
        let err: EngineError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, EngineError::Redaction(_)));
    }
}
