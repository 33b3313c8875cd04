use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/bookings.db";
const DEFAULT_RELAY_URL: &str = "https://api.callmebot.com/whatsapp.php";
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);
// One appointment cannot outlast a day.
const MAX_SERVICE_DURATION_MINUTES: i64 = 24 * 60;

/// How the bot receives updates from Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMode {
    /// Long-poll `getUpdates` through the teloxide dispatcher.
    Polling,
    /// Serve `POST /webhook`, guarded by the shared secret header.
    Webhook { url: String, secret: String },
}

/// Credentials for the WhatsApp relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub phone: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Business rules that depend on the salon's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub utc_offset_hours: i32,
    pub service_duration_minutes: i64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub retention_days: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Telegram user id allowed to run admin commands; 0 disables them.
    pub admin_user_id: u64,
    pub http_port: u16,
    pub mode: BotMode,
    pub relay: Option<RelayConfig>,
    pub database: DatabaseSettings,
    pub schedule: ScheduleSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let admin_user_id = parse_var("ADMIN_USER_ID", 0u64)?;
        let http_port = parse_var("HTTP_PORT", 3000u16)?;

        Ok(Config {
            telegram_bot_token: token,
            admin_user_id,
            http_port,
            mode: BotMode::from_env()?,
            relay: RelayConfig::from_env(),
            database: DatabaseSettings::from_env()?,
            schedule: ScheduleSettings::from_env()?,
        })
    }
}

impl BotMode {
    pub fn from_env() -> Result<Self> {
        let mode = var_or("BOT_MODE", "polling");
        match mode.trim().to_lowercase().as_str() {
            "polling" => Ok(BotMode::Polling),
            "webhook" => {
                let url = non_empty_var("WEBHOOK_URL")
                    .ok_or_else(|| anyhow!("WEBHOOK_URL must be set in webhook mode"))?;
                let secret = non_empty_var("WEBHOOK_SECRET")
                    .ok_or_else(|| anyhow!("WEBHOOK_SECRET must be set in webhook mode"))?;
                validate_webhook_secret(&secret)?;
                Ok(BotMode::Webhook { url, secret })
            }
            other => Err(anyhow!("Invalid BOT_MODE '{}': expected polling or webhook", other)),
        }
    }
}

impl RelayConfig {
    /// The relay is optional: without both a phone and an API key bookings
    /// are still accepted, they just are not forwarded.
    pub fn from_env() -> Option<Self> {
        let phone = non_empty_var("WHATSAPP_PHONE")?;
        let api_key = non_empty_var("WHATSAPP_API_KEY")?;

        Some(RelayConfig {
            endpoint: var_or("WHATSAPP_RELAY_URL", DEFAULT_RELAY_URL),
            phone,
            api_key,
            timeout: RELAY_TIMEOUT,
        })
    }
}

impl DatabaseSettings {
    pub fn from_env() -> Result<Self> {
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5u32)?;
        if max_connections == 0 {
            return Err(anyhow!("Invalid DATABASE_MAX_CONNECTIONS"));
        }

        Ok(DatabaseSettings {
            url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            max_connections,
        })
    }
}

impl ScheduleSettings {
    pub fn from_env() -> Result<Self> {
        let utc_offset_hours = parse_var("UTC_OFFSET_HOURS", 6i32)?;
        if !(-12..=14).contains(&utc_offset_hours) {
            return Err(anyhow!("Invalid UTC_OFFSET_HOURS"));
        }

        let service_duration_minutes = parse_var("SERVICE_DURATION_MINUTES", 120i64)?;
        if !(1..=MAX_SERVICE_DURATION_MINUTES).contains(&service_duration_minutes) {
            return Err(anyhow!("Invalid SERVICE_DURATION_MINUTES"));
        }

        let opening_time = parse_time_var("OPENING_TIME", "08:00")?;
        let closing_time = parse_time_var("CLOSING_TIME", "21:00")?;
        if opening_time >= closing_time {
            return Err(anyhow!("OPENING_TIME must be earlier than CLOSING_TIME"));
        }

        let retention_days = parse_var("RETENTION_DAYS", 2i64)?;
        if retention_days < 0 {
            return Err(anyhow!("Invalid RETENTION_DAYS"));
        }

        Ok(ScheduleSettings {
            utc_offset_hours,
            service_duration_minutes,
            opening_time,
            closing_time,
            retention_days,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match non_empty_var(key) {
        Some(raw) => raw.parse().map_err(|_| anyhow!("Invalid {}", key)),
        None => Ok(default),
    }
}

fn parse_time_var(key: &str, default: &str) -> Result<NaiveTime> {
    let raw = var_or(key, default);
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| anyhow!("Invalid {}", key))
}

// Telegram accepts 1-256 characters from A-Z, a-z, 0-9, `_` and `-`.
fn validate_webhook_secret(secret: &str) -> Result<()> {
    let valid_chars = secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if secret.len() > 256 || !valid_chars {
        return Err(anyhow!("Invalid WEBHOOK_SECRET"));
    }
    Ok(())
}
