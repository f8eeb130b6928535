use chrono::{DateTime, Duration as TimeSpan, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;

use crate::error::{StorageError, StorageResult};
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Timestamps are stored as fixed-width UTC text so that string comparison
/// in SQL matches chronological order.
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Longest span in days a window or grant may cover. Keeps computed
/// timestamps within four-digit years, so the stored text stays fixed width.
pub const MAX_SPAN_DAYS: u32 = 700_000;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and applies
/// pending schema migrations before returning.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use fincore::storage::create_pool;
///
/// let pool = create_pool("finbot.db")?;
/// # Ok::<(), fincore::error::StorageError>(())
/// ```
pub fn create_pool(database_path: &str) -> StorageResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(30)));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    log::info!("Database ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection goes back to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> StorageResult<DbConnection> {
    Ok(pool.get()?)
}

/// Runs `op` with a pooled connection on tokio's blocking thread pool.
///
/// The connection is checked out for exactly one logical operation and is
/// returned to the pool when `op` finishes, fails, or the task is dropped.
pub async fn with_connection<T, F>(pool: &DbPool, op: F) -> StorageResult<T>
where
    F: FnOnce(&mut DbConnection) -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = get_connection(&pool)?;
        op(&mut conn)
    })
    .await?
}

/// `days` as a duration, clamped to [`MAX_SPAN_DAYS`].
pub(crate) fn days_span(days: u32) -> TimeSpan {
    TimeSpan::days(i64::from(days.min(MAX_SPAN_DAYS)))
}

pub(crate) fn encode_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_WRITE_FORMAT).to_string()
}

pub(crate) fn decode_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_READ_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::InvalidTimestamp(format!("{:?}: {}", raw, e)))
}
