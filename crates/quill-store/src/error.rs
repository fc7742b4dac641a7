use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// A concurrent writer held the database during a reply transaction.
    /// Retryable: re-read the parent and run the whole insert again.
    #[error("Concurrent modification, retry the operation")]
    Conflict,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Invalid input from the domain layer.
    #[error(transparent)]
    Domain(#[from] quill_shared::QuillError),

    /// Chrono parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),
}

impl StoreError {
    /// Whether the caller should retry the failed operation from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}
