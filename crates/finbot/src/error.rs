use fincore::StorageError;
use thiserror::Error;

/// Bad user input, reported back to the chat as a usage hint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing arguments")]
    MissingArguments,

    #[error("amount {0:?} is not a number")]
    InvalidAmount(String),

    #[error("category is empty")]
    EmptyCategory,

    #[error("user id {0:?} is not a number")]
    InvalidUserId(String),

    #[error("day count {0:?} is not a positive number")]
    InvalidDays(String),
}

/// Everything that can go wrong while serving one update.
///
/// None of these stop the bot: handlers log the error and answer with a
/// generic failure message.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type BotResult<T> = Result<T, BotError>;
