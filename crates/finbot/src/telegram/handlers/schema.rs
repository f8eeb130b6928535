//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, PreCheckoutQuery};

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::commands::handle_command;
use crate::telegram::format::GENERIC_FAILURE;
use crate::telegram::payments::{answer_pre_checkout, handle_successful_payment};
use crate::telegram::Bot;

/// Creates the dispatcher schema for the bot.
///
/// The same tree is used for polling and webhook mode.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_payment = deps.clone();
    let deps_commands = deps;

    dptree::entry()
        // Successful payment handler must be first
        .branch(successful_payment_handler(deps_payment))
        .branch(command_handler(deps_commands))
        .branch(pre_checkout_handler())
}

/// Handler for successful Telegram payments
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_successful_payment(&bot, &msg, &deps).await {
                    log::error!("Failed to handle successful payment in chat {}: {}", msg.chat.id, e);
                    // The payment went through, so the user must hear about the failure
                    let _ = bot.send_message(msg.chat.id, GENERIC_FAILURE).await;
                }
                Ok(())
            }
        })
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                if let Err(e) = handle_command(&bot, &msg, cmd, &deps).await {
                    log::error!("Command failed in chat {}: {}", msg.chat.id, e);
                    let _ = bot.send_message(msg.chat.id, GENERIC_FAILURE).await;
                }
                Ok(())
            }
        },
    ))
}

fn pre_checkout_handler() -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(|bot: Bot, query: PreCheckoutQuery| async move {
        if let Err(e) = answer_pre_checkout(&bot, query).await {
            log::error!("Failed to answer pre_checkout_query: {}", e);
        }
        Ok(())
    })
}
