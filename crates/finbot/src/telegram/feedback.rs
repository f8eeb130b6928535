//! Feedback forwarding to the developer chat

use teloxide::prelude::*;

use crate::error::BotResult;
use crate::telegram::handlers::{sender_id, HandlerDeps};
use crate::telegram::Bot;

pub const FEEDBACK_USAGE: &str = "Write your message after the command, for example:\n/feedback Please add monthly budgets";

/// Text delivered to the developer
pub fn format_feedback(user_id: i64, username: Option<&str>, text: &str) -> String {
    let who = match username {
        Some(name) => format!("{} (@{})", user_id, name),
        None => user_id.to_string(),
    };
    format!("📝 Feedback from {}:\n\n{}", who, text.trim())
}

/// Handles `/feedback <text>`.
pub async fn handle_feedback(bot: &Bot, msg: &Message, deps: &HandlerDeps, text: &str) -> BotResult<()> {
    if text.trim().is_empty() {
        bot.send_message(msg.chat.id, FEEDBACK_USAGE).await?;
        return Ok(());
    }

    let Some(developer_id) = deps.settings.developer_id else {
        bot.send_message(msg.chat.id, "Sorry, feedback is not accepted right now.")
            .await?;
        return Ok(());
    };

    let user_id = sender_id(msg);
    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());

    bot.send_message(ChatId(developer_id), format_feedback(user_id, username, text))
        .await?;
    log::info!("Forwarded feedback from user {} to developer", user_id);

    bot.send_message(msg.chat.id, "Thanks! Your feedback has been sent.")
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_feedback_with_username() {
        assert_eq!(
            format_feedback(42, Some("alice"), "  great bot  "),
            "📝 Feedback from 42 (@alice):\n\ngreat bot"
        );
    }

    #[test]
    fn test_format_feedback_without_username() {
        assert_eq!(format_feedback(42, None, "hi"), "📝 Feedback from 42:\n\nhi");
    }
}
