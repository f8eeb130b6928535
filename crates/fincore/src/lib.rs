//! # fincore
//!
//! Core of the finbot expense tracker, with no Telegram dependency.
//!
//! - [`storage`]: SQLite pool, migrations, expense and subscription stores
//! - [`service`]: the finance façade that normalizes input for the stores
//! - [`export`]: CSV rendering of expenses
//! - [`config`], [`logging`], [`error`], [`clock`]: ambient infrastructure

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Settings;
pub use error::{StorageError, StorageResult};
pub use export::expenses_to_csv;
pub use service::{normalize_category, FinanceService};
pub use storage::{
    create_pool, CategoryTotals, DbPool, Expense, ExpenseRepository, ExpenseStore, Subscription,
    SubscriptionRepository, SubscriptionStore,
};
