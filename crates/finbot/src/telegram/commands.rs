//! Command handlers
//!
//! Each handler parses its arguments, calls the finance service or the
//! subscription store and replies with plain text.

use fincore::config::stats::{EXTENDED_WINDOW_DAYS, FREE_WINDOW_DAYS};
use fincore::{expenses_to_csv, Clock};
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::error::{BotResult, ValidationError};
use crate::telegram::bot::{help_text, Command};
use crate::telegram::feedback::handle_feedback;
use crate::telegram::format::{
    format_added, format_expense_list, format_stats, format_status, parse_add_args, parse_grant_args, ADD_USAGE,
    PAYWALL_TEXT,
};
use crate::telegram::handlers::{sender_id, HandlerDeps};
use crate::telegram::payments::send_subscribe_offer;
use crate::telegram::Bot;

/// File name of the CSV export document
pub const EXPORT_FILE_NAME: &str = "expenses.csv";

/// Routes a parsed command to its handler.
pub async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> BotResult<()> {
    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(msg.chat.id, help_text()).await?;
        }
        Command::Add(args) => handle_add_command(bot, msg, deps, &args).await?,
        Command::List => handle_list_command(bot, msg, deps).await?,
        Command::Stats => handle_stats_command(bot, msg, deps, FREE_WINDOW_DAYS).await?,
        Command::Stats30 => {
            if require_subscription(bot, msg, deps).await? {
                handle_stats_command(bot, msg, deps, EXTENDED_WINDOW_DAYS).await?;
            }
        }
        Command::Export => {
            if require_subscription(bot, msg, deps).await? {
                handle_export_command(bot, msg, deps).await?;
            }
        }
        Command::Subscribe => {
            send_subscribe_offer(bot, msg.chat.id, sender_id(msg), &deps.settings).await?;
        }
        Command::Status => handle_status_command(bot, msg, deps).await?,
        Command::Feedback(text) => handle_feedback(bot, msg, deps, &text).await?,
        Command::Grant(args) => handle_grant_command(bot, msg, deps, &args).await?,
    }

    Ok(())
}

async fn handle_add_command(bot: &Bot, msg: &Message, deps: &HandlerDeps, args: &str) -> BotResult<()> {
    let parsed = match parse_add_args(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Rejected /add arguments {:?}: {}", args, e);
            bot.send_message(msg.chat.id, ADD_USAGE).await?;
            return Ok(());
        }
    };

    let expense = deps
        .finance
        .record_expense(sender_id(msg), parsed.amount, &parsed.category)
        .await?;
    bot.send_message(msg.chat.id, format_added(&expense)).await?;
    Ok(())
}

async fn handle_list_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> BotResult<()> {
    let expenses = deps.finance.get_recent_expenses(sender_id(msg), None).await?;
    bot.send_message(msg.chat.id, format_expense_list(&expenses)).await?;
    Ok(())
}

async fn handle_stats_command(bot: &Bot, msg: &Message, deps: &HandlerDeps, days: u32) -> BotResult<()> {
    let totals = deps.finance.get_week_stats(sender_id(msg), Some(days)).await?;
    bot.send_message(msg.chat.id, format_stats(&totals, days)).await?;
    Ok(())
}

async fn handle_export_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> BotResult<()> {
    let expenses = deps.finance.export_expenses(sender_id(msg), None).await?;
    if expenses.is_empty() {
        bot.send_message(
            msg.chat.id,
            format!("No expenses in the last {} days to export.", EXTENDED_WINDOW_DAYS),
        )
        .await?;
        return Ok(());
    }

    let csv = expenses_to_csv(&expenses);
    log::info!("Exporting {} expenses for chat {}", expenses.len(), msg.chat.id);
    bot.send_document(msg.chat.id, InputFile::memory(csv.into_bytes()).file_name(EXPORT_FILE_NAME))
        .caption(format!("Expenses for the last {} days", EXTENDED_WINDOW_DAYS))
        .await?;
    Ok(())
}

async fn handle_status_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> BotResult<()> {
    let subscription = deps.subscriptions.get_subscription(sender_id(msg)).await?;
    let text = format_status(subscription.as_ref(), deps.clock.now());
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_grant_command(bot: &Bot, msg: &Message, deps: &HandlerDeps, args: &str) -> BotResult<()> {
    let caller = sender_id(msg);
    if !deps.settings.is_developer(caller) {
        log::warn!("User {} tried to use /grant", caller);
        bot.send_message(msg.chat.id, "This command is only available to the developer.")
            .await?;
        return Ok(());
    }

    let (user_id, days) = match parse_grant_args(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            let hint = match e {
                ValidationError::InvalidUserId(_) | ValidationError::InvalidDays(_) => e.to_string(),
                _ => "Use: /grant <user_id> <days>".to_string(),
            };
            bot.send_message(msg.chat.id, hint).await?;
            return Ok(());
        }
    };

    let subscription = deps.subscriptions.grant_subscription(user_id, days).await?;
    log::info!(
        "Developer {} granted {} days to user {}, expires at {:?}",
        caller,
        days,
        user_id,
        subscription.expires_at
    );

    let until = subscription
        .expires_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();
    bot.send_message(
        msg.chat.id,
        format!("Granted {} days to user {} (until {}).", days, user_id, until),
    )
    .await?;
    Ok(())
}

/// Replies with the paywall and returns false when the sender has no active subscription.
async fn require_subscription(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> BotResult<bool> {
    if deps.subscriptions.has_active_subscription(sender_id(msg)).await? {
        return Ok(true);
    }

    bot.send_message(msg.chat.id, PAYWALL_TEXT).await?;
    Ok(false)
}
