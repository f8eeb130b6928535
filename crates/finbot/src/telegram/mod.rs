//! Telegram layer: commands, dispatcher schema, payments and transport

pub mod bot;
pub mod commands;
pub mod feedback;
pub mod format;
pub mod handlers;
pub mod payments;
pub mod transport;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use teloxide::Bot;
