//! # finbot
//!
//! Telegram front end of the expense tracker. Storage, statistics and export
//! live in [`fincore`]; this crate parses commands, talks to the Bot API and
//! sells subscriptions.

pub mod cli;
pub mod error;
pub mod telegram;

pub use error::{BotError, BotResult, ValidationError};
