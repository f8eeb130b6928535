use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::StorageResult;
use crate::storage::db::{days_span, decode_timestamp, encode_timestamp, with_connection, DbPool};

/// Paid access of one user. At most one record exists per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Active means an expiry exists and lies strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at > now)
    }
}

struct SubscriptionRow {
    user_id: i64,
    expires_at: Option<String>,
    created_at: String,
}

impl SubscriptionRow {
    fn into_subscription(self) -> StorageResult<Subscription> {
        Ok(Subscription {
            user_id: self.user_id,
            expires_at: self.expires_at.as_deref().map(decode_timestamp).transpose()?,
            created_at: decode_timestamp(&self.created_at)?,
        })
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubscriptionRow> {
    Ok(SubscriptionRow {
        user_id: row.get(0)?,
        expires_at: row.get(1)?,
        created_at: row.get(2)?,
    })
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_subscription(&self, user_id: i64) -> StorageResult<Option<Subscription>>;

    /// Creates or overwrites the user's expiry. `created_at` survives updates.
    async fn set_subscription(&self, user_id: i64, expires_at: Option<DateTime<Utc>>) -> StorageResult<Subscription>;

    async fn has_active_subscription(&self, user_id: i64) -> StorageResult<bool>;

    /// Sets the expiry to `now + days`, replacing whatever time was left.
    async fn grant_subscription(&self, user_id: i64, days: u32) -> StorageResult<Subscription>;
}

/// SQLite-backed [`SubscriptionRepository`].
#[derive(Clone)]
pub struct SubscriptionStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl SubscriptionStore {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionStore {
    async fn get_subscription(&self, user_id: i64) -> StorageResult<Option<Subscription>> {
        let row = with_connection(&self.pool, move |conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, expires_at, created_at FROM subscriptions WHERE user_id = ?1",
                    params![user_id],
                    parse_row,
                )
                .optional()?;
            Ok(row)
        })
        .await?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    async fn set_subscription(&self, user_id: i64, expires_at: Option<DateTime<Utc>>) -> StorageResult<Subscription> {
        let expires_at = expires_at.map(encode_timestamp);
        let created_at = encode_timestamp(self.clock.now());

        // Last writer wins when two renewals for one user race
        let row = with_connection(&self.pool, move |conn| {
            let row = conn.query_row(
                "INSERT INTO subscriptions (user_id, expires_at, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET expires_at = excluded.expires_at
                 RETURNING user_id, expires_at, created_at",
                params![user_id, expires_at, created_at],
                parse_row,
            )?;
            Ok(row)
        })
        .await?;

        let subscription = row.into_subscription()?;
        log::info!(
            "Subscription for user {} set to expire at {:?}",
            subscription.user_id,
            subscription.expires_at
        );
        Ok(subscription)
    }

    async fn has_active_subscription(&self, user_id: i64) -> StorageResult<bool> {
        let now = encode_timestamp(self.clock.now());

        with_connection(&self.pool, move |conn| {
            let active: bool = conn.query_row(
                "SELECT EXISTS(
                     SELECT 1 FROM subscriptions
                     WHERE user_id = ?1 AND expires_at IS NOT NULL AND expires_at > ?2
                 )",
                params![user_id, now],
                |row| row.get(0),
            )?;
            Ok(active)
        })
        .await
    }

    async fn grant_subscription(&self, user_id: i64, days: u32) -> StorageResult<Subscription> {
        let expires_at = self.clock.now() + days_span(days);
        self.set_subscription(user_id, Some(expires_at)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::db::create_pool;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SubscriptionStore, Arc<ManualClock>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()));
        let store = SubscriptionStore::new(pool, clock.clone());
        (dir, store, clock)
    }

    #[test]
    fn test_is_active_at() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut sub = Subscription {
            user_id: 1,
            expires_at: None,
            created_at: now,
        };
        assert!(!sub.is_active_at(now));

        sub.expires_at = Some(now);
        assert!(!sub.is_active_at(now), "expiry equal to now is already inactive");

        sub.expires_at = Some(now + Duration::seconds(1));
        assert!(sub.is_active_at(now));
    }

    #[tokio::test]
    async fn test_get_subscription_missing() {
        let (_dir, store, _clock) = setup();
        assert_eq!(store.get_subscription(5).await.unwrap(), None);
        assert!(!store.has_active_subscription(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_subscription_creates_and_updates_in_place() {
        let (_dir, store, clock) = setup();
        let first_seen = clock.now();
        let expiry = first_seen + Duration::days(30);

        let created = store.set_subscription(1, Some(expiry)).await.unwrap();
        assert_eq!(
            created,
            Subscription {
                user_id: 1,
                expires_at: Some(expiry),
                created_at: first_seen,
            }
        );

        clock.advance(Duration::days(3));
        let later_expiry = clock.now() + Duration::days(30);
        let updated = store.set_subscription(1, Some(later_expiry)).await.unwrap();
        assert_eq!(updated.expires_at, Some(later_expiry));
        assert_eq!(updated.created_at, first_seen);

        assert_eq!(store.get_subscription(1).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_set_subscription_can_clear_expiry() {
        let (_dir, store, clock) = setup();
        store.set_subscription(1, Some(clock.now() + Duration::days(1))).await.unwrap();
        assert!(store.has_active_subscription(1).await.unwrap());

        let cleared = store.set_subscription(1, None).await.unwrap();
        assert_eq!(cleared.expires_at, None);
        assert!(!store.has_active_subscription(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_active_subscription_follows_clock() {
        let (_dir, store, clock) = setup();
        store.set_subscription(1, Some(clock.now() + Duration::hours(1))).await.unwrap();
        assert!(store.has_active_subscription(1).await.unwrap());

        clock.advance(Duration::hours(1));
        assert!(!store.has_active_subscription(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_subscription_overwrites_remaining_time() {
        let (_dir, store, clock) = setup();
        let start = clock.now();

        let first = store.grant_subscription(1, 30).await.unwrap();
        assert_eq!(first.expires_at, Some(start + Duration::days(30)));

        clock.advance(Duration::days(10));
        let renewed = store.grant_subscription(1, 30).await.unwrap();
        assert_eq!(renewed.expires_at, Some(start + Duration::days(40)));
        assert_eq!(renewed.created_at, start);
    }

    #[tokio::test]
    async fn test_subscriptions_are_per_user() {
        let (_dir, store, _clock) = setup();
        store.grant_subscription(1, 30).await.unwrap();
        assert!(store.has_active_subscription(1).await.unwrap());
        assert!(!store.has_active_subscription(2).await.unwrap());
    }
}
