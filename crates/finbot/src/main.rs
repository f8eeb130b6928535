use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use finbot::cli::{Cli, Commands};
use finbot::telegram::transport::{run_polling, run_webhook};
use finbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use fincore::logging::{init_logger, log_settings};
use fincore::{
    create_pool, Clock, ExpenseStore, FinanceService, Settings, SubscriptionRepository, SubscriptionStore, SystemClock,
};

/// Main entry point for the Telegram bot
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();
    let settings = Arc::new(Settings::from_env());

    // Initialize logger (console + file)
    init_logger(&settings.log_file_path)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(settings).await,
        Commands::Migrate => run_migrate(&settings),
        Commands::Grant { user_id, days } => run_grant(&settings, user_id, days).await,
    }
}

async fn run_bot(settings: Arc<Settings>) -> Result<()> {
    log::info!("Starting bot...");
    log_settings(&settings);

    let bot = create_bot(&settings)?;

    let db_pool =
        create_pool(&settings.database_path).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let expenses = Arc::new(ExpenseStore::new(db_pool.clone(), Arc::clone(&clock)));
    let subscriptions: Arc<dyn SubscriptionRepository> = Arc::new(SubscriptionStore::new(db_pool, Arc::clone(&clock)));
    let finance = Arc::new(FinanceService::new(expenses));

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let handler = schema(HandlerDeps::new(Arc::clone(&settings), finance, subscriptions, clock));

    match settings.webhook_domain {
        Some(ref domain) => run_webhook(bot, handler, &settings, domain).await?,
        None => run_polling(bot, handler).await,
    }

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

fn run_migrate(settings: &Settings) -> Result<()> {
    create_pool(&settings.database_path).map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    log::info!("Database at {} is up to date", settings.database_path);
    Ok(())
}

async fn run_grant(settings: &Settings, user_id: i64, days: u32) -> Result<()> {
    if days == 0 {
        anyhow::bail!("--days must be at least 1");
    }

    let db_pool =
        create_pool(&settings.database_path).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    let store = SubscriptionStore::new(db_pool, Arc::new(SystemClock));

    let subscription = store.grant_subscription(user_id, days).await?;
    log::info!(
        "Granted {} days to user {}, expires at {:?}",
        days,
        user_id,
        subscription.expires_at
    );
    Ok(())
}
