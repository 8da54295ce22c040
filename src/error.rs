use thiserror::Error;

/// Input rejected before any statement reaches the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required.")]
    Required(&'static str),

    #[error("{field} must be a date in YYYY-MM-DD format, got \"{value}\".")]
    MalformedDate { field: &'static str, value: String },

    #[error("Return date cannot be earlier than the borrow date.")]
    ReturnBeforeBorrow,
}

/// Errors raised by the borrow record operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input was rejected; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No borrow record has this id.
    #[error("Record {0} not found.")]
    RecordNotFound(i64),

    /// The referenced book is not in the catalogue.
    #[error("Book {0} does not exist.")]
    UnknownBook(i64),

    /// Any other failure reported by SQLite.
    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl LedgerError {
    /// Whether the failure happened before the store was touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}
