use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::admin::AdminAction;
use crate::bot::commands::Command;
use crate::bot::handlers::BotHandler;
use crate::errors::{BotError, HandlerResult};
use crate::services::conversation::Reply;
use crate::utils::logging::log_command_start;

const STORAGE_UNAVAILABLE: &str = "⚠️ Something went wrong on our side. Please try again later.";
const UNKNOWN_COMMAND: &str = "Unknown command. Send /help to see available commands.";
const TEXT_ONLY: &str = "Please answer with a text message.";

// Telegram rejects messages longer than 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4096;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    handler: &BotHandler,
    bot_username: &str,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0;
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(chat_id, TEXT_ONLY).await?;
        return Ok(());
    };

    if text.starts_with('/') {
        return match Command::parse(text, bot_username) {
            Ok(cmd) => command_handler(&bot, chat_id, user_id, cmd, handler).await,
            Err(_) => {
                bot.send_message(chat_id, UNKNOWN_COMMAND).await?;
                Ok(())
            }
        };
    }

    let outcome = handler.flow.handle_text(user_id as i64, text).await;
    send_outcome(&bot, chat_id, outcome).await
}

async fn command_handler(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cmd: Command,
    handler: &BotHandler,
) -> HandlerResult {
    let flow = &handler.flow;
    let admin_action = match cmd {
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string()).await?;
            return Ok(());
        }
        Command::Start => {
            log_command_start("/start", user_id as i64, chat_id.0, None);
            return send_outcome(bot, chat_id, flow.start(user_id as i64).await).await;
        }
        Command::Cancel => {
            log_command_start("/cancel", user_id as i64, chat_id.0, None);
            return send_outcome(bot, chat_id, flow.cancel(user_id as i64).await).await;
        }
        Command::ViewBookings => AdminAction::ViewBookings,
        Command::Delete(argument) => AdminAction::Delete(argument),
        Command::Clear => AdminAction::Clear,
    };

    log_command_start(admin_action.name(), user_id as i64, chat_id.0, None);
    let outcome = handler.admin.run(user_id, admin_action).await.map(Reply::text);
    send_outcome(bot, chat_id, outcome).await
}

/// Sends the reply, or a generic apology when storage failed.
pub async fn send_outcome(
    bot: &Bot,
    chat_id: ChatId,
    outcome: Result<Reply, sqlx::Error>,
) -> HandlerResult {
    match outcome {
        Ok(reply) => send_reply(bot, chat_id, reply).await,
        Err(e) => {
            bot.send_message(chat_id, STORAGE_UNAVAILABLE).await?;
            Err(BotError::Database(e))
        }
    }
}

/// Long texts are split; the keyboard goes with the last part.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> HandlerResult {
    let mut parts = split_message(&reply.text, MAX_MESSAGE_CHARS);
    let last = parts.pop().unwrap_or_default();

    for part in parts {
        bot.send_message(chat_id, part).await?;
    }

    let request = bot.send_message(chat_id, last);
    match reply.keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}

/// Splits on line boundaries so no part exceeds `limit` characters.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let mut line = line;
        let mut line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        // A single line longer than the limit is cut at character boundaries.
        while line_len > limit {
            let cut = line
                .char_indices()
                .nth(limit)
                .map_or(line.len(), |(index, _)| index);
            parts.push(line[..cut].to_string());
            line = &line[cut..];
            line_len -= limit;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() || parts.is_empty() {
        parts.push(current);
    }
    parts
}
