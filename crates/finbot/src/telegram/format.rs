//! Argument parsing and reply text for the chat commands.
//!
//! Everything here is pure so it can be tested without a Telegram message.

use chrono::{DateTime, Utc};
use fincore::{normalize_category, CategoryTotals, Expense, Subscription};

use crate::error::ValidationError;

/// Reply for commands that need an active subscription
pub const PAYWALL_TEXT: &str =
    "This feature needs an active subscription. Use /subscribe to get 30-day statistics and CSV export.";

pub const ADD_USAGE: &str = "Wrong format.\nUse: /add <amount> <category>\nExample: /add 199.90 food";

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

/// Parsed `/add` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct AddArgs {
    pub amount: f64,
    pub category: String,
}

/// Parses `<amount> <category>`.
///
/// A comma is accepted as decimal separator. The category is everything after
/// the first whitespace run, normalized.
pub fn parse_add_args(args: &str) -> Result<AddArgs, ValidationError> {
    let (amount_raw, category_raw) = args
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(ValidationError::MissingArguments)?;

    let amount = amount_raw
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ValidationError::InvalidAmount(amount_raw.to_string()))?;

    let category = normalize_category(category_raw);
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }

    Ok(AddArgs { amount, category })
}

/// Parses `/grant <user_id> <days>`.
pub fn parse_grant_args(args: &str) -> Result<(i64, u32), ValidationError> {
    let mut parts = args.split_whitespace();
    let (user_raw, days_raw) = match (parts.next(), parts.next(), parts.next()) {
        (Some(user), Some(days), None) => (user, days),
        _ => return Err(ValidationError::MissingArguments),
    };

    let user_id = user_raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidUserId(user_raw.to_string()))?;
    let days = days_raw
        .parse::<u32>()
        .ok()
        .filter(|days| *days > 0)
        .ok_or_else(|| ValidationError::InvalidDays(days_raw.to_string()))?;

    Ok((user_id, days))
}

pub fn format_added(expense: &Expense) -> String {
    format!("Added expense: {:.2}, category: {}", expense.amount, expense.category)
}

/// One line per expense, newest first, as given.
pub fn format_expense_list(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses recorded yet.".to_string();
    }

    let lines: Vec<String> = expenses
        .iter()
        .map(|e| format!("{} — {:.2} [{}]", e.created_at.format("%d.%m %H:%M"), e.amount, e.category))
        .collect();

    format!("Recent expenses:\n\n{}", lines.join("\n"))
}

/// Categories by amount descending with their share of the total.
pub fn format_stats(totals: &CategoryTotals, days: u32) -> String {
    if totals.is_empty() {
        return format!("No expenses in the last {} days.", days);
    }

    let total: f64 = totals.values().sum();

    let mut rows: Vec<(&String, &f64)> = totals.iter().collect();
    // BTreeMap iteration is by name, so the stable sort keeps names ascending within equal amounts
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    let lines: Vec<String> = rows
        .into_iter()
        .map(|(category, amount)| {
            let percent = if total != 0.0 { amount / total * 100.0 } else { 0.0 };
            format!("{}: {:.2} ({:.1}%)", category, amount, percent)
        })
        .collect();

    format!("Statistics for {} days:\n\n{}\n\nTotal: {:.2}", days, lines.join("\n"), total)
}

pub fn format_status(subscription: Option<&Subscription>, now: DateTime<Utc>) -> String {
    match subscription.and_then(|s| s.expires_at.map(|expires_at| (s, expires_at))) {
        Some((sub, expires_at)) if sub.is_active_at(now) => {
            format!("Subscription active until {}.", expires_at.format("%Y-%m-%d %H:%M UTC"))
        }
        Some((_, expires_at)) => format!(
            "Subscription expired on {}. Use /subscribe to renew.",
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "No active subscription. Use /subscribe to unlock 30-day statistics and CSV export.".to_string(),
    }
}
