use teloxide::prelude::*;

use crate::bot::handlers::message::send_outcome;
use crate::bot::handlers::BotHandler;
use crate::errors::HandlerResult;
use crate::utils::logging::log_command_start;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, handler: &BotHandler) -> HandlerResult {
    // Stop the button's loading spinner whatever happens next.
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let user_id = q.from.id.0 as i64;
    let chat_id = message.chat.id;

    log_command_start("callback", user_id, chat_id.0, Some(data));

    let outcome = handler.flow.handle_service_choice(user_id, data).await;
    send_outcome(&bot, chat_id, outcome).await
}
