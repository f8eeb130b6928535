//! Runtime configuration.
//!
//! Everything is read once at startup into [`Settings`] and handed to the
//! components that need it. Nothing reads the environment after that.

use std::env;

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "finbot.db";

/// Default log file
pub const DEFAULT_LOG_FILE_PATH: &str = "finbot.log";

/// Default HTTP port for webhook mode
pub const DEFAULT_PORT: u16 = 8000;

/// Subscription defaults
pub mod subscription {
    /// Price in major currency units
    pub const DEFAULT_PRICE: u32 = 299;

    pub const DEFAULT_CURRENCY: &str = "RUB";

    /// How long one payment keeps the subscription active
    pub const DEFAULT_DAYS: u32 = 30;
}

/// Statistics windows
pub mod stats {
    /// Window of the free `/stats` command
    pub const FREE_WINDOW_DAYS: u32 = 7;

    /// Window of the subscription-gated `/stats30` command and of CSV export
    pub const EXTENDED_WINDOW_DAYS: u32 = 30;

    /// Number of entries shown by `/list`
    pub const RECENT_LIMIT: u32 = 10;
}

/// Process-wide settings, built once and passed by `Arc` to whoever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bot_token: String,
    pub database_path: String,
    pub log_file_path: String,
    /// Chat that receives `/feedback` messages and may use admin commands
    pub developer_id: Option<i64>,
    /// External page selling subscriptions, used when no payment provider is configured
    pub subscription_link: Option<String>,
    pub payment_provider_token: Option<String>,
    /// Price in major currency units (299 means 299.00)
    pub subscription_price: u32,
    pub subscription_currency: String,
    pub subscription_days: u32,
    pub webhook_domain: Option<String>,
    pub webhook_secret: Option<String>,
    pub port: u16,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Empty values count as unset. Unparsable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let bot_token = get("BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN")).unwrap_or_default();

        let database_path = get("DATABASE_URL")
            .map(|url| database_path_from_url(&url))
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        Self {
            bot_token,
            database_path,
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            developer_id: get("DEVELOPER_ID").and_then(|raw| raw.parse::<i64>().ok()),
            subscription_link: get("SUBSCRIPTION_LINK"),
            payment_provider_token: get("PAYMENT_PROVIDER_TOKEN"),
            subscription_price: parse_digits(get("SUBSCRIPTION_PRICE"), subscription::DEFAULT_PRICE),
            subscription_currency: get("SUBSCRIPTION_CURRENCY")
                .unwrap_or_else(|| subscription::DEFAULT_CURRENCY.to_string()),
            subscription_days: parse_digits(get("SUBSCRIPTION_DAYS"), subscription::DEFAULT_DAYS),
            webhook_domain: get("WEBHOOK_DOMAIN"),
            webhook_secret: get("WEBHOOK_SECRET"),
            port: get("PORT")
                .and_then(|raw| raw.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    /// True when `user_id` is the configured developer.
    pub fn is_developer(&self, user_id: i64) -> bool {
        self.developer_id == Some(user_id)
    }

    /// True when subscriptions can be sold inside the chat.
    pub fn has_payment_provider(&self) -> bool {
        self.payment_provider_token.is_some()
    }

    /// Price in minor units (kopecks, cents) as the payment API expects it.
    pub fn subscription_price_minor_units(&self) -> u32 {
        self.subscription_price.saturating_mul(100)
    }
}

/// Accepts plain paths as well as `sqlite://` style URLs.
fn database_path_from_url(url: &str) -> String {
    let path = url
        .strip_prefix("sqlite+aiosqlite:///")
        .or_else(|| url.strip_prefix("sqlite:///"))
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    if path.is_empty() {
        DEFAULT_DATABASE_PATH.to_string()
    } else {
        path.to_string()
    }
}

/// Only plain digit strings are accepted; anything else yields the default.
fn parse_digits(raw: Option<String>, default: u32) -> u32 {
    raw.filter(|value| value.chars().all(|c| c.is_ascii_digit()))
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}
