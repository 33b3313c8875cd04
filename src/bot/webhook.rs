use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use teloxide::{types::Update, Bot};

use crate::bot::handlers::BotHandler;

/// Header Telegram echoes back with the secret given to `setWebhook`.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

#[derive(Clone)]
pub struct WebhookState {
    pub handler: BotHandler,
    pub bot: Bot,
    pub bot_username: Arc<str>,
    pub secret: Arc<str>,
}

/// `POST /webhook`; requests without the shared secret get 401.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_secret))
        .with_state(state)
}

async fn require_secret(
    State(state): State<WebhookState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(state.secret.as_ref()) {
        tracing::warn!("Rejected webhook call with missing or invalid secret");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

/// Acknowledges once the update has its turn in the sender's queue; the
/// update itself is handled in a spawned task holding that turn.
async fn receive_update(State(state): State<WebhookState>, Json(update): Json<Update>) -> StatusCode {
    let turn = state.handler.lock_sender(&update).await;

    tokio::spawn(async move {
        let update_id = update.id;
        if let Err(e) = state
            .handler
            .handle_update(state.bot.clone(), update, &state.bot_username)
            .await
        {
            tracing::error!("Failed to handle update {}: {}", update_id, e);
        }
        drop(turn);
    });

    StatusCode::OK
}
