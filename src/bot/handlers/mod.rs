pub mod callback;
pub mod message;
pub mod ordering;

use std::sync::Arc;
use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::{Me, UpdateKind},
};
use tokio::sync::OwnedMutexGuard;

use crate::bot::commands::admin::AdminConsole;
use crate::errors::{BotError, HandlerResult};
use crate::services::conversation::BookingFlow;
use ordering::UserLocks;

/// Routes Telegram updates to the booking flow and the admin console.
///
/// The same handler serves both transports: [`schema`](Self::schema) plugs
/// into the polling dispatcher, [`handle_update`](Self::handle_update) is
/// called for each update received on the webhook, after
/// [`lock_sender`](Self::lock_sender) has queued it behind the sender's
/// earlier updates.
#[derive(Clone)]
pub struct BotHandler {
    pub flow: Arc<BookingFlow>,
    pub admin: Arc<AdminConsole>,
    pub locks: UserLocks,
}

impl BotHandler {
    pub fn new(flow: BookingFlow, admin: AdminConsole) -> Self {
        Self {
            flow: Arc::new(flow),
            admin: Arc::new(admin),
            locks: UserLocks::new(),
        }
    }

    /// Waits until no earlier update from the same user is being handled.
    /// Updates without a sender are not ordered.
    pub async fn lock_sender(&self, update: &Update) -> Option<OwnedMutexGuard<()>> {
        let user_id = match &update.kind {
            UpdateKind::Message(msg) => msg.from().map(|user| user.id.0),
            UpdateKind::CallbackQuery(q) => Some(q.from.id.0),
            _ => None,
        }?;
        Some(self.locks.acquire(user_id).await)
    }

    pub fn schema(&self) -> UpdateHandler<BotError> {
        let on_message = self.clone();
        let on_callback = self.clone();

        dptree::entry()
            .branch(Update::filter_message().endpoint(
                move |bot: Bot, msg: Message, me: Me| {
                    let handler = on_message.clone();
                    async move { message::message_handler(bot, msg, &handler, me.username()).await }
                },
            ))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery| {
                    let handler = on_callback.clone();
                    async move { callback::callback_handler(bot, q, &handler).await }
                },
            ))
    }

    pub async fn handle_update(&self, bot: Bot, update: Update, bot_username: &str) -> HandlerResult {
        match update.kind {
            UpdateKind::Message(msg) => message::message_handler(bot, msg, self, bot_username).await,
            UpdateKind::CallbackQuery(q) => callback::callback_handler(bot, q, self).await,
            _ => {
                tracing::debug!("Ignoring update {} of unsupported kind", update.id);
                Ok(())
            }
        }
    }
}
