use thiserror::Error;

/// Errors raised by the storage layer.
///
/// Absence of data is never an error: list queries return an empty `Vec`
/// and point lookups return `None`. Everything here is a real failure that
/// the caller is expected to surface, not retry.
///
/// # Example
///
/// ```no_run
/// use fincore::error::StorageError;
///
/// fn report(err: StorageError) {
///     log::error!("Storage failure: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite errors (constraint violations, I/O, malformed SQL)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// The blocking task running the query panicked or was cancelled
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A stored timestamp could not be decoded
    #[error("Invalid timestamp in database: {0}")]
    InvalidTimestamp(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
