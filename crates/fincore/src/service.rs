//! Finance service: the entry point the bot uses for expenses.
//!
//! Category normalization happens here and nowhere else, so everything that
//! reaches the store is already trimmed and lower-cased.

use std::sync::Arc;

use crate::config::stats::{EXTENDED_WINDOW_DAYS, FREE_WINDOW_DAYS, RECENT_LIMIT};
use crate::error::StorageResult;
use crate::storage::{CategoryTotals, Expense, ExpenseRepository};

/// Trims surrounding whitespace and lower-cases the label.
///
/// An all-whitespace input normalizes to an empty string, which callers must
/// reject before recording.
pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone)]
pub struct FinanceService {
    expenses: Arc<dyn ExpenseRepository>,
}

impl FinanceService {
    pub fn new(expenses: Arc<dyn ExpenseRepository>) -> Self {
        Self { expenses }
    }

    pub async fn record_expense(&self, user_id: i64, amount: f64, category: &str) -> StorageResult<Expense> {
        let category = normalize_category(category);
        self.expenses.add_expense(user_id, amount, &category).await
    }

    /// Newest expenses first. `None` means the default of 10.
    pub async fn get_recent_expenses(&self, user_id: i64, limit: Option<u32>) -> StorageResult<Vec<Expense>> {
        self.expenses
            .list_expenses(user_id, limit.unwrap_or(RECENT_LIMIT))
            .await
    }

    /// Per-category totals. `None` means the free 7-day window.
    pub async fn get_week_stats(&self, user_id: i64, days: Option<u32>) -> StorageResult<CategoryTotals> {
        self.expenses
            .stats_by_period(user_id, days.unwrap_or(FREE_WINDOW_DAYS))
            .await
    }

    /// Expenses for CSV export, oldest first. `None` means 30 days.
    pub async fn export_expenses(&self, user_id: i64, days: Option<u32>) -> StorageResult<Vec<Expense>> {
        self.expenses
            .list_expenses_since(user_id, days.unwrap_or(EXTENDED_WINDOW_DAYS))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records every call so tests can check what reached the store.
    #[derive(Default)]
    struct RecordingRepository {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingRepository {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ExpenseRepository for RecordingRepository {
        async fn add_expense(&self, user_id: i64, amount: f64, category: &str) -> StorageResult<Expense> {
            self.record(format!("add {} {} {}", user_id, amount, category));
            Ok(Expense {
                id: 1,
                user_id,
                amount,
                category: category.to_string(),
                created_at: Utc::now(),
            })
        }

        async fn list_expenses(&self, user_id: i64, limit: u32) -> StorageResult<Vec<Expense>> {
            self.record(format!("list {} {}", user_id, limit));
            Ok(Vec::new())
        }

        async fn stats_by_period(&self, user_id: i64, days: u32) -> StorageResult<CategoryTotals> {
            self.record(format!("stats {} {}", user_id, days));
            Ok(CategoryTotals::new())
        }

        async fn list_expenses_since(&self, user_id: i64, days: u32) -> StorageResult<Vec<Expense>> {
            self.record(format!("since {} {}", user_id, days));
            Ok(Vec::new())
        }
    }

    fn service() -> (Arc<RecordingRepository>, FinanceService) {
        let repo = Arc::new(RecordingRepository::default());
        let service = FinanceService::new(repo.clone());
        (repo, service)
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(" Food "), "food");
        assert_eq!(normalize_category("TAXI"), "taxi");
        assert_eq!(normalize_category("Кафе"), "кафе");
        assert_eq!(normalize_category("eating out"), "eating out");
        assert_eq!(normalize_category("   "), "");
    }

    #[tokio::test]
    async fn test_record_expense_normalizes_before_storing() {
        let (repo, service) = service();

        let expense = service.record_expense(1, 250.0, "  Groceries\t").await.unwrap();
        assert_eq!(expense.category, "groceries");
        assert_eq!(repo.calls(), vec!["add 1 250 groceries"]);
    }

    #[tokio::test]
    async fn test_defaults() {
        let (repo, service) = service();

        service.get_recent_expenses(3, None).await.unwrap();
        service.get_week_stats(3, None).await.unwrap();
        service.export_expenses(3, None).await.unwrap();

        assert_eq!(repo.calls(), vec!["list 3 10", "stats 3 7", "since 3 30"]);
    }

    #[tokio::test]
    async fn test_explicit_arguments_pass_through() {
        let (repo, service) = service();

        service.get_recent_expenses(3, Some(2)).await.unwrap();
        service.get_week_stats(3, Some(30)).await.unwrap();
        service.export_expenses(3, Some(90)).await.unwrap();

        assert_eq!(repo.calls(), vec!["list 3 2", "stats 3 30", "since 3 90"]);
    }
}
