//! SQLite persistence: connection pool, migrations and the two stores

pub mod db;
pub mod expenses;
pub mod migrations;
pub mod subscriptions;

// Re-exports for convenience
pub use db::{create_pool, get_connection, with_connection, DbConnection, DbPool};
pub use expenses::{CategoryTotals, Expense, ExpenseRepository, ExpenseStore};
pub use subscriptions::{Subscription, SubscriptionRepository, SubscriptionStore};
