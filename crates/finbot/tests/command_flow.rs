//! Command flows exercised through the pure parsing/formatting layer and real stores.

use chrono::{Duration, TimeZone, Utc};
use finbot::telegram::format::{format_added, format_expense_list, format_stats, format_status, parse_add_args};
use finbot::telegram::payments::{parse_subscription_payload, subscription_payload};
use finbot::telegram::Command;
use fincore::{
    create_pool, Clock, ExpenseStore, FinanceService, ManualClock, SubscriptionRepository, SubscriptionStore,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use tempfile::TempDir;

struct App {
    _dir: TempDir,
    clock: Arc<ManualClock>,
    finance: FinanceService,
    subscriptions: SubscriptionStore,
}

fn app() -> App {
    let dir = tempfile::tempdir().unwrap();
    let pool = create_pool(dir.path().join("bot.db").to_str().unwrap()).unwrap();
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 10, 9, 15, 0).unwrap()));

    App {
        _dir: dir,
        finance: FinanceService::new(Arc::new(ExpenseStore::new(pool.clone(), clock.clone()))),
        subscriptions: SubscriptionStore::new(pool, clock.clone()),
        clock,
    }
}

/// What the `/add` handler does once the command is parsed
async fn add(app: &App, user_id: i64, text: &str) -> String {
    let Command::Add(args) = Command::parse(text, "finbot").unwrap() else {
        panic!("not an /add command: {}", text);
    };
    let parsed = parse_add_args(&args).unwrap();
    let expense = app
        .finance
        .record_expense(user_id, parsed.amount, &parsed.category)
        .await
        .unwrap();
    format_added(&expense)
}

#[tokio::test]
async fn add_then_list_then_stats() {
    let app = app();

    assert_eq!(add(&app, 1, "/add 250 Food").await, "Added expense: 250.00, category: food");
    app.clock.advance(Duration::minutes(5));
    assert_eq!(add(&app, 1, "/add 99,5 Coffee").await, "Added expense: 99.50, category: coffee");

    let recent = app.finance.get_recent_expenses(1, None).await.unwrap();
    assert_eq!(
        format_expense_list(&recent),
        "Recent expenses:\n\n10.02 09:20 — 99.50 [coffee]\n10.02 09:15 — 250.00 [food]"
    );

    let stats = app.finance.get_week_stats(1, None).await.unwrap();
    assert_eq!(
        format_stats(&stats, 7),
        "Statistics for 7 days:\n\nfood: 250.00 (71.5%)\ncoffee: 99.50 (28.5%)\n\nTotal: 349.50"
    );
}

#[tokio::test]
async fn other_users_see_nothing() {
    let app = app();
    add(&app, 1, "/add 10 food").await;

    let recent = app.finance.get_recent_expenses(2, None).await.unwrap();
    assert_eq!(format_expense_list(&recent), "No expenses recorded yet.");

    let stats = app.finance.get_week_stats(2, Some(30)).await.unwrap();
    assert_eq!(format_stats(&stats, 30), "No expenses in the last 30 days.");
}

#[tokio::test]
async fn payment_unlocks_and_expires() {
    let app = app();
    let user_id = 777;

    assert!(!app.subscriptions.has_active_subscription(user_id).await.unwrap());

    // Invoice payload survives the round trip through Telegram
    let payload = subscription_payload(user_id);
    let paid_by = parse_subscription_payload(&payload).unwrap();
    let subscription = app.subscriptions.grant_subscription(paid_by, 30).await.unwrap();

    assert!(app.subscriptions.has_active_subscription(user_id).await.unwrap());
    assert_eq!(
        format_status(Some(&subscription), app.clock.now()),
        "Subscription active until 2025-03-12 09:15 UTC."
    );

    app.clock.advance(Duration::days(31));
    assert!(!app.subscriptions.has_active_subscription(user_id).await.unwrap());

    let stored = app.subscriptions.get_subscription(user_id).await.unwrap();
    assert!(format_status(stored.as_ref(), app.clock.now()).starts_with("Subscription expired on 2025-03-12"));
}
