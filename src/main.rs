//! # Booking Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts the
//! retention job and the HTTP server, then receives Telegram updates by long
//! polling or through the webhook.

use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;
use teloxide::prelude::*;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booking_bot::bot::commands::admin::AdminConsole;
use booking_bot::bot::handlers::BotHandler;
use booking_bot::bot::webhook::{self, WebhookState};
use booking_bot::config::{BotMode, Config};
use booking_bot::database::connection::DatabaseManager;
use booking_bot::services::conversation::{BookingFlow, FlowSettings};
use booking_bot::services::health::HealthService;
use booking_bot::services::notifier::{DisabledNotifier, Notifier, WhatsAppRelay};
use booking_bot::services::retention::{RetentionPolicy, RetentionService};
use booking_bot::services::timezone::LocalClock;
use booking_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Booking Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Mode: {}",
        config.database.url,
        config.http_port,
        match config.mode {
            BotMode::Polling => "polling",
            BotMode::Webhook { .. } => "webhook",
        }
    );
    if config.admin_user_id == 0 {
        tracing::warn!("ADMIN_USER_ID is not set, admin commands are disabled");
    }

    // Initialize database
    let db = Arc::new(DatabaseManager::from_settings(&config.database).await?);
    db.run_migrations().await?;
    info!("Database initialized successfully");

    let clock = LocalClock::from_offset_hours(config.schedule.utc_offset_hours)?;
    let retention = RetentionPolicy::new(config.schedule.retention_days, clock);

    let notifier: Arc<dyn Notifier> = match &config.relay {
        Some(relay) => {
            info!("WhatsApp relay enabled via {}", relay.endpoint);
            Arc::new(WhatsAppRelay::new(relay)?)
        }
        None => {
            tracing::warn!("WHATSAPP_PHONE or WHATSAPP_API_KEY missing, bookings will not be forwarded");
            Arc::new(DisabledNotifier)
        }
    };

    let flow = BookingFlow::new(
        db.pool.clone(),
        FlowSettings {
            service_duration: Duration::minutes(config.schedule.service_duration_minutes),
            opening_time: config.schedule.opening_time,
            closing_time: config.schedule.closing_time,
        },
        clock,
        notifier,
    );
    let admin = AdminConsole::new(db.pool.clone(), config.admin_user_id, retention);
    let handler = BotHandler::new(flow, admin);

    // Start retention job
    let mut retention_service = RetentionService::new(db.pool.clone(), retention).await?;
    if let Err(e) = retention_service.start().await {
        tracing::error!("Failed to start retention service: {:#}", e);
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let mut router = HealthService::new(db.clone()).router;

    let bot_task = match &config.mode {
        BotMode::Polling => {
            let schema = handler.schema();
            tokio::spawn(async move {
                Dispatcher::builder(bot, schema)
                    .enable_ctrlc_handler()
                    .build()
                    .dispatch()
                    .await;
            })
        }
        BotMode::Webhook { url, secret } => {
            let me = bot.get_me().await.context("Failed to fetch bot identity")?;
            let webhook_url = reqwest::Url::parse(url).context("Invalid WEBHOOK_URL")?;
            bot.set_webhook(webhook_url)
                .secret_token(secret.clone())
                .await
                .context("Failed to register webhook")?;
            log_system_event("Webhook registered", Some(url));

            router = router.merge(webhook::router(WebhookState {
                handler,
                bot,
                bot_username: Arc::from(me.username()),
                secret: Arc::from(secret.as_str()),
            }));

            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
            })
        }
    };

    let router = router.layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .with_context(|| format!("Failed to bind to port {}", config.http_port))?;
    info!("HTTP server starting on port {}", config.http_port);

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = http_task => {
            if let Err(e) = result {
                tracing::error!("HTTP task error: {}", e);
            }
        }
    }

    if let Err(e) = retention_service.stop().await {
        tracing::warn!("Error stopping retention service: {:#}", e);
    }

    info!("Application stopped");
    Ok(())
}
