use thiserror::Error;

/// Errors that abort handling of a single update.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type HandlerResult = Result<(), BotError>;
