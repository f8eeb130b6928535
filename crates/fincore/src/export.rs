use crate::storage::Expense;

/// Header line of every export
pub const CSV_HEADER: &str = "date,amount,category";

/// Renders expenses as `date,amount,category` CSV.
///
/// Dates are UTC `YYYY-MM-DD HH:MM`, amounts carry two decimals. Categories
/// are written verbatim, so a comma inside one shifts the row's columns.
pub fn expenses_to_csv(expenses: &[Expense]) -> String {
    let mut content = String::with_capacity(CSV_HEADER.len() + 1 + expenses.len() * 32);
    content.push_str(CSV_HEADER);
    content.push('\n');

    for expense in expenses {
        content.push_str(&format!(
            "{},{:.2},{}\n",
            expense.created_at.format("%Y-%m-%d %H:%M"),
            expense.amount,
            expense.category
        ));
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn expense(id: i64, amount: f64, category: &str, minute: u32) -> Expense {
        Expense {
            id,
            user_id: 1,
            amount,
            category: category.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 7, 9, minute, 42).unwrap(),
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(expenses_to_csv(&[]), "date,amount,category\n");
    }

    #[test]
    fn test_rows_in_given_order() {
        let csv = expenses_to_csv(&[expense(1, 250.0, "food", 5), expense(2, 12.5, "coffee", 30)]);
        assert_eq!(
            csv,
            "date,amount,category\n2025-03-07 09:05,250.00,food\n2025-03-07 09:30,12.50,coffee\n"
        );
    }

    #[test]
    fn test_amount_rounds_to_two_decimals() {
        let csv = expenses_to_csv(&[expense(1, 1.23456, "misc", 0)]);
        assert!(csv.ends_with("2025-03-07 09:00,1.23,misc\n"));
    }

    #[test]
    fn test_category_is_not_escaped() {
        let csv = expenses_to_csv(&[expense(1, 1.0, "a,b \"c\"", 0)]);
        assert_eq!(csv.lines().nth(1), Some("2025-03-07 09:00,1.00,a,b \"c\""));
    }
}
