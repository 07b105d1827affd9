/// Errors that can occur within the storage layer.
///
/// Surfaced to callers as retryable failures: the ingestion path aborts on
/// a reading-insert error and logs-and-continues on alert bookkeeping
/// errors (the persisted reading is never lost either way).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An underlying SQLite error.
    #[error("Storage: SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure while preparing the database location.
    #[error("Storage: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored column held a value the domain types reject (e.g. an
    /// unknown alert_type spelling).
    #[error("Storage: invalid value in column '{column}': {detail}")]
    InvalidColumn {
        column: &'static str,
        detail: String,
    },
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
