use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "finbot")]
#[command(author, version, about = "Telegram bot for personal expense tracking", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot (webhook when WEBHOOK_DOMAIN is set, long polling otherwise)
    Run,

    /// Apply database migrations and exit
    Migrate,

    /// Grant a subscription without a payment
    Grant {
        /// Telegram user id
        #[arg(long)]
        user_id: i64,

        /// Subscription length in days, counted from now
        #[arg(long, default_value_t = fincore::config::subscription::DEFAULT_DAYS)]
        days: u32,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
