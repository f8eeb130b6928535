use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::StorageResult;
use crate::storage::db::{days_span, decode_timestamp, encode_timestamp, with_connection, DbPool};

/// Sum of amounts per category, ordered by category name.
pub type CategoryTotals = BTreeMap<String, f64>;

/// A single recorded expense. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Row as read from SQLite, before the timestamp is decoded.
struct ExpenseRow {
    id: i64,
    user_id: i64,
    amount: f64,
    category: String,
    created_at: String,
}

impl ExpenseRow {
    fn into_expense(self) -> StorageResult<Expense> {
        Ok(Expense {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            category: self.category,
            created_at: decode_timestamp(&self.created_at)?,
        })
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRow> {
    Ok(ExpenseRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Persistence operations on expenses.
///
/// Callers are expected to pass an already normalized, non-empty category.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Stores a new expense stamped with the current time and returns it.
    async fn add_expense(&self, user_id: i64, amount: f64, category: &str) -> StorageResult<Expense>;

    /// Up to `limit` newest expenses of the user, newest first.
    async fn list_expenses(&self, user_id: i64, limit: u32) -> StorageResult<Vec<Expense>>;

    /// Per-category sums over the last `days` days.
    async fn stats_by_period(&self, user_id: i64, days: u32) -> StorageResult<CategoryTotals>;

    /// Every expense of the user from the last `days` days, oldest first.
    async fn list_expenses_since(&self, user_id: i64, days: u32) -> StorageResult<Vec<Expense>>;
}

/// SQLite-backed [`ExpenseRepository`].
#[derive(Clone)]
pub struct ExpenseStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl ExpenseStore {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn window_start(&self, days: u32) -> String {
        encode_timestamp(self.clock.now() - days_span(days))
    }
}

#[async_trait]
impl ExpenseRepository for ExpenseStore {
    async fn add_expense(&self, user_id: i64, amount: f64, category: &str) -> StorageResult<Expense> {
        let created_at = encode_timestamp(self.clock.now());
        let category = category.to_string();

        let row = with_connection(&self.pool, move |conn| {
            let row = conn.query_row(
                "INSERT INTO expenses (user_id, amount, category, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, user_id, amount, category, created_at",
                params![user_id, amount, category, created_at],
                parse_row,
            )?;
            Ok(row)
        })
        .await?;

        let expense = row.into_expense()?;
        log::debug!(
            "Stored expense id={} user={} amount={} category={}",
            expense.id,
            expense.user_id,
            expense.amount,
            expense.category
        );
        Ok(expense)
    }

    async fn list_expenses(&self, user_id: i64, limit: u32) -> StorageResult<Vec<Expense>> {
        let rows = with_connection(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, amount, category, created_at FROM expenses
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, i64::from(limit)], parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    async fn stats_by_period(&self, user_id: i64, days: u32) -> StorageResult<CategoryTotals> {
        let since = self.window_start(days);

        with_connection(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT category, SUM(amount) FROM expenses
                 WHERE user_id = ?1 AND created_at >= ?2
                 GROUP BY category",
            )?;
            let rows = stmt.query_map(params![user_id, since], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?;

            let mut totals = CategoryTotals::new();
            for row in rows {
                let (category, total) = row?;
                totals.insert(category, total);
            }
            Ok(totals)
        })
        .await
    }

    async fn list_expenses_since(&self, user_id: i64, days: u32) -> StorageResult<Vec<Expense>> {
        let since = self.window_start(days);

        let rows = with_connection(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, amount, category, created_at FROM expenses
                 WHERE user_id = ?1 AND created_at >= ?2
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map(params![user_id, since], parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }
}
