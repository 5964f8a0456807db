//! Error types for ledger operations.

use crate::source::SourceId;
use thiserror::Error;

/// Failures surfaced by [`crate::Ledger`] operations.
///
/// A failed operation never changes ledger state and never emits an event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Rejected input (capacity, storage, reading amounts, thresholds).
    #[error("{0}")]
    Validation(String),

    /// Import document is not JSON or lacks the `sources`/`logs` keys.
    #[error("{0}")]
    ImportFormat(String),

    /// A log entry or command refers to a source id that does not exist.
    #[error("No water source with id {0}")]
    DanglingReference(SourceId),

    /// A legacy log entry refers to a source position that does not exist.
    #[error("No water source at position {0}")]
    DanglingIndex(usize),

    /// Duplicate ids in stored or imported state.
    #[error("Invalid file format: duplicate id {0}")]
    DuplicateId(u64),

    /// The id space above the largest existing id is used up.
    #[error("No ids left after {0}")]
    IdsExhausted(u64),
}

impl LedgerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
