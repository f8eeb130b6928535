//! Bot initialization and the command set
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use fincore::Settings;

use crate::error::{BotError, BotResult};
use crate::telegram::Bot;

/// Timeout for every Bot API request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "about the bot and the command list")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "add an expense: /add <amount> <category>")]
    Add(String),
    #[command(description = "show recent expenses")]
    List,
    #[command(description = "statistics for 7 days")]
    Stats,
    #[command(description = "statistics for 30 days (subscription)")]
    Stats30,
    #[command(description = "export 30 days to CSV (subscription)")]
    Export,
    #[command(description = "buy a subscription")]
    Subscribe,
    #[command(description = "subscription status")]
    Status,
    #[command(description = "send feedback to the developer")]
    Feedback(String),
    #[command(hide)]
    Grant(String),
}

/// Creates a Bot instance from the configured token
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(BotError::Config)` - Token missing or HTTP client could not be built
pub fn create_bot(settings: &Settings) -> BotResult<Bot> {
    if settings.bot_token.is_empty() {
        return Err(BotError::Config("BOT_TOKEN is not set".to_string()));
    }

    let client = ClientBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Bot::with_client(settings.bot_token.clone(), client))
}

/// Commands shown in the Telegram menu. `/grant` stays hidden.
pub fn menu_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "about the bot and the command list"),
        BotCommand::new("add", "add an expense: /add <amount> <category>"),
        BotCommand::new("list", "show recent expenses"),
        BotCommand::new("stats", "statistics for 7 days"),
        BotCommand::new("stats30", "statistics for 30 days (subscription)"),
        BotCommand::new("export", "export 30 days to CSV (subscription)"),
        BotCommand::new("subscribe", "buy a subscription"),
        BotCommand::new("status", "subscription status"),
        BotCommand::new("feedback", "send feedback to the developer"),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(menu_commands()).await?;
    Ok(())
}

/// Greeting for `/start` and `/help`
pub fn help_text() -> String {
    format!(
        "Hi! I am a finance tracker 💰\n\nI record your expenses and show statistics.\n\n{}",
        Command::descriptions()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_descriptions() {
        let command_list = Command::descriptions().to_string();

        assert!(command_list.contains("Available commands"));
        assert!(command_list.contains("/add"));
        assert!(command_list.contains("/stats30"));
        assert!(command_list.contains("/feedback"));
        assert!(!command_list.contains("/grant"));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("/add 250 food", "finbot").unwrap(),
            Command::Add("250 food".to_string())
        );
        assert_eq!(Command::parse("/stats30", "finbot").unwrap(), Command::Stats30);
        assert_eq!(
            Command::parse("/grant 1 30", "finbot").unwrap(),
            Command::Grant("1 30".to_string())
        );
        assert!(Command::parse("/unknown", "finbot").is_err());
    }

    #[test]
    fn test_menu_matches_visible_commands() {
        let menu: Vec<String> = menu_commands().into_iter().map(|c| c.command).collect();
        assert_eq!(
            menu,
            vec!["start", "add", "list", "stats", "stats30", "export", "subscribe", "status", "feedback"]
        );
    }

    #[test]
    fn test_create_bot_requires_token() {
        let settings = Settings::from_lookup(|_| None);
        assert!(matches!(create_bot(&settings), Err(BotError::Config(_))));
    }

    #[test]
    fn test_help_text_lists_commands() {
        let text = help_text();
        assert!(text.starts_with("Hi! I am a finance tracker"));
        assert!(text.contains("/list"));
    }
}
