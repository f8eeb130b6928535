//! Subscription sales: invoices, external link, pre-checkout and payment confirmation

use fincore::Settings;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, LabeledPrice, PreCheckoutQuery};
use url::Url;

use crate::error::BotResult;
use crate::telegram::handlers::HandlerDeps;
use crate::telegram::Bot;

/// Prefix of every invoice payload this bot issues
pub const SUBSCRIPTION_PAYLOAD_PREFIX: &str = "subscription:";

/// Payload carried through the invoice so the payment can be attributed
pub fn subscription_payload(user_id: i64) -> String {
    format!("{}{}", SUBSCRIPTION_PAYLOAD_PREFIX, user_id)
}

/// Returns the user id of a well-formed subscription payload.
pub fn parse_subscription_payload(payload: &str) -> Option<i64> {
    payload
        .strip_prefix(SUBSCRIPTION_PAYLOAD_PREFIX)
        .and_then(|rest| rest.parse::<i64>().ok())
}

/// Pre-checkout approval only checks the prefix.
pub fn is_subscription_payload(payload: &str) -> bool {
    payload.starts_with(SUBSCRIPTION_PAYLOAD_PREFIX)
}

/// What `/subscribe` shows, decided from configuration
#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOffer {
    Invoice {
        provider_token: String,
        price_minor_units: u32,
        currency: String,
        days: u32,
    },
    Link(Url),
    Unavailable,
}

impl SubscribeOffer {
    /// A payment provider wins over the external link.
    pub fn from_settings(settings: &Settings) -> Result<Self, url::ParseError> {
        if let Some(ref token) = settings.payment_provider_token {
            return Ok(Self::Invoice {
                provider_token: token.clone(),
                price_minor_units: settings.subscription_price_minor_units(),
                currency: settings.subscription_currency.clone(),
                days: settings.subscription_days,
            });
        }

        match settings.subscription_link {
            Some(ref link) => Ok(Self::Link(Url::parse(link)?)),
            None => Ok(Self::Unavailable),
        }
    }
}

/// Sends the invoice, the link button or an apology.
pub async fn send_subscribe_offer(bot: &Bot, chat_id: ChatId, user_id: i64, settings: &Settings) -> BotResult<()> {
    match SubscribeOffer::from_settings(settings)? {
        SubscribeOffer::Invoice {
            provider_token,
            price_minor_units,
            currency,
            days,
        } => {
            log::info!(
                "Sending invoice to user {}: {} minor units of {} for {} days",
                user_id,
                price_minor_units,
                currency,
                days
            );
            bot.send_invoice(
                chat_id,
                "Finbot subscription",
                format!("30-day statistics and CSV export for {} days", days),
                subscription_payload(user_id),
                currency,
                vec![LabeledPrice::new(format!("Subscription for {} days", days), price_minor_units)],
            )
            .provider_token(provider_token)
            .await?;
        }
        SubscribeOffer::Link(url) => {
            let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url("💳 Pay", url)]]);
            bot.send_message(
                chat_id,
                "A subscription unlocks 30-day statistics (/stats30) and CSV export (/export).",
            )
            .reply_markup(keyboard)
            .await?;
        }
        SubscribeOffer::Unavailable => {
            bot.send_message(chat_id, "Subscriptions are not available right now.").await?;
        }
    }

    Ok(())
}

/// Approves queries carrying our payload, rejects everything else.
pub async fn answer_pre_checkout(bot: &Bot, query: PreCheckoutQuery) -> BotResult<()> {
    log::info!(
        "Received pre_checkout_query: id={}, payload={}",
        query.id,
        query.invoice_payload
    );

    if is_subscription_payload(&query.invoice_payload) {
        bot.answer_pre_checkout_query(query.id, true).await?;
        log::info!("Pre-checkout query approved for payload: {}", query.invoice_payload);
    } else {
        bot.answer_pre_checkout_query(query.id, false)
            .error_message("Unknown payment type")
            .await?;
        log::warn!("Pre-checkout query rejected for payload: {}", query.invoice_payload);
    }

    Ok(())
}

/// Grants `subscription_days` from now to the user named in the payload.
pub async fn handle_successful_payment(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> BotResult<()> {
    let Some(payment) = msg.successful_payment() else {
        return Ok(());
    };

    log::info!(
        "Successful payment: {} {} (minor units), payload {}",
        payment.total_amount,
        payment.currency,
        payment.invoice_payload
    );

    let Some(user_id) = parse_subscription_payload(&payment.invoice_payload) else {
        log::error!("Invalid payment payload: {}", payment.invoice_payload);
        return Ok(());
    };

    let subscription = deps
        .subscriptions
        .grant_subscription(user_id, deps.settings.subscription_days)
        .await?;

    let text = match subscription.expires_at {
        Some(expires_at) => format!(
            "Payment received, thank you! Subscription active until {}.",
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "Payment received, thank you!".to_string(),
    };
    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let pairs: Vec<(String, String)> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    }

    #[test]
    fn test_payload_format() {
        assert_eq!(subscription_payload(123456789), "subscription:123456789");
        assert_eq!(parse_subscription_payload("subscription:123456789"), Some(123456789));
        assert_eq!(parse_subscription_payload("subscription:-100"), Some(-100));
    }

    #[test]
    fn test_bad_payloads() {
        assert_eq!(parse_subscription_payload("subscription:"), None);
        assert_eq!(parse_subscription_payload("subscription:abc"), None);
        assert_eq!(parse_subscription_payload("subscription:premium:1"), None);
        assert_eq!(parse_subscription_payload("donation:1"), None);
    }

    #[test]
    fn test_pre_checkout_prefix_check() {
        assert!(is_subscription_payload("subscription:1"));
        assert!(is_subscription_payload("subscription:"));
        assert!(!is_subscription_payload("Subscription:1"));
        assert!(!is_subscription_payload("donation:1"));
    }

    #[test]
    fn test_offer_prefers_provider() {
        let settings = settings(&[
            ("PAYMENT_PROVIDER_TOKEN", "284685063:TEST"),
            ("SUBSCRIPTION_LINK", "https://example.com/pay"),
        ]);
        assert_eq!(
            SubscribeOffer::from_settings(&settings).unwrap(),
            SubscribeOffer::Invoice {
                provider_token: "284685063:TEST".to_string(),
                price_minor_units: 29_900,
                currency: "RUB".to_string(),
                days: 30,
            }
        );
    }

    #[test]
    fn test_offer_falls_back_to_link() {
        let settings = settings(&[("SUBSCRIPTION_LINK", "https://example.com/pay")]);
        assert_eq!(
            SubscribeOffer::from_settings(&settings).unwrap(),
            SubscribeOffer::Link(Url::parse("https://example.com/pay").unwrap())
        );
    }

    #[test]
    fn test_offer_unavailable_or_bad_link() {
        assert_eq!(
            SubscribeOffer::from_settings(&settings(&[])).unwrap(),
            SubscribeOffer::Unavailable
        );
        assert!(SubscribeOffer::from_settings(&settings(&[("SUBSCRIPTION_LINK", "not a url")])).is_err());
    }
}
