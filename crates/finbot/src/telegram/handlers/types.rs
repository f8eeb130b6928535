//! Handler types and dependencies

use std::sync::Arc;

use fincore::{Clock, FinanceService, Settings, SubscriptionRepository};
use teloxide::types::Message;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub settings: Arc<Settings>,
    pub finance: Arc<FinanceService>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub clock: Arc<dyn Clock>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        settings: Arc<Settings>,
        finance: Arc<FinanceService>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            finance,
            subscriptions,
            clock,
        }
    }
}

/// Telegram user id of the sender, falling back to the chat id for
/// messages without a sender (channel posts).
pub fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .and_then(|u| i64::try_from(u.id.0).ok())
        .unwrap_or(msg.chat.id.0)
}
