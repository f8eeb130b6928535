//! Update delivery: long polling or an axum webhook server

use std::net::SocketAddr;

use fincore::Settings;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use url::Url;

use crate::error::{BotError, BotResult};
use crate::telegram::handlers::HandlerError;
use crate::telegram::Bot;

/// Path the webhook server listens on
pub const WEBHOOK_PATH: &str = "/webhook";

/// `<domain>/webhook`; a bare host gets `https://`.
pub fn webhook_url(domain: &str) -> Result<Url, url::ParseError> {
    let domain = domain.trim().trim_end_matches('/');
    let base = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    };
    Url::parse(&format!("{}{}", base, WEBHOOK_PATH))
}

/// Telegram accepts 1-256 characters from `A-Z a-z 0-9 _ -`.
pub fn is_valid_secret_token(token: &str) -> bool {
    (1..=256).contains(&token.len())
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Runs the dispatcher with long polling until Ctrl-C.
pub async fn run_polling(bot: Bot, handler: UpdateHandler<HandlerError>) {
    log::info!("Starting bot in long polling mode");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Registers the webhook and serves it on `0.0.0.0:PORT` until Ctrl-C.
pub async fn run_webhook(
    bot: Bot,
    handler: UpdateHandler<HandlerError>,
    settings: &Settings,
    domain: &str,
) -> BotResult<()> {
    let url = webhook_url(domain)?;
    let address = SocketAddr::from(([0, 0, 0, 0], settings.port));

    let mut options = webhooks::Options::new(address, url.clone());
    if let Some(ref secret) = settings.webhook_secret {
        if !is_valid_secret_token(secret) {
            return Err(BotError::Config(
                "WEBHOOK_SECRET may only contain A-Z, a-z, 0-9, '_' and '-' (1-256 characters)".to_string(),
            ));
        }
        options = options.secret_token(secret.clone());
    }

    log::info!("Starting bot in webhook mode at {} (listening on {})", url, address);
    let listener = webhooks::axum(bot.clone(), options).await?;

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}
