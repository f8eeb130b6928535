//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::config::Settings;

/// Initialize logger for both console and file output
///
/// The log file is opened in append mode so restarts keep the history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a logger is already installed
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at startup without leaking secrets
pub fn log_settings(settings: &Settings) {
    log::info!("Configuration:");
    log::info!("  • Database: {}", settings.database_path);
    log::info!("  • Log file: {}", settings.log_file_path);
    match settings.developer_id {
        Some(id) => log::info!("  • Developer ID: {}", id),
        None => log::warn!("  • DEVELOPER_ID not set, /feedback and admin commands are disabled"),
    }

    if settings.has_payment_provider() {
        log::info!(
            "  • Payments: provider invoice, {} {} for {} days",
            settings.subscription_price,
            settings.subscription_currency,
            settings.subscription_days
        );
    } else if let Some(ref link) = settings.subscription_link {
        log::info!("  • Payments: external link {}", link);
    } else {
        log::warn!("  • Payments: not configured, /subscribe will report unavailability");
    }

    match settings.webhook_domain {
        Some(ref domain) => log::info!("  • Transport: webhook via {} on port {}", domain, settings.port),
        None => log::info!("  • Transport: long polling"),
    }
}
