use booking_bot::config::{BotMode, Config};
use chrono::NaiveTime;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const ALL_VARS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "ADMIN_USER_ID",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "HTTP_PORT",
    "BOT_MODE",
    "WEBHOOK_URL",
    "WEBHOOK_SECRET",
    "WHATSAPP_PHONE",
    "WHATSAPP_API_KEY",
    "WHATSAPP_RELAY_URL",
    "UTC_OFFSET_HOURS",
    "SERVICE_DURATION_MINUTES",
    "OPENING_TIME",
    "CLOSING_TIME",
    "RETENTION_DAYS",
];

fn clear_env() {
    for key in ALL_VARS {
        env::remove_var(key);
    }
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.admin_user_id, 0);
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.mode, BotMode::Polling);
    assert!(config.relay.is_none());
    assert_eq!(config.database.url, "sqlite:./data/bookings.db");
    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.schedule.utc_offset_hours, 6);
    assert_eq!(config.schedule.service_duration_minutes, 120);
    assert_eq!(config.schedule.opening_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    assert_eq!(config.schedule.closing_time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    assert_eq!(config.schedule.retention_days, 2);

    clear_env();
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("ADMIN_USER_ID", "123456789");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("BOT_MODE", "webhook");
    env::set_var("WEBHOOK_URL", "https://bot.example.com/webhook");
    env::set_var("WEBHOOK_SECRET", "s3cret_token-1");
    env::set_var("WHATSAPP_PHONE", "996700000000");
    env::set_var("WHATSAPP_API_KEY", "key");
    env::set_var("UTC_OFFSET_HOURS", "3");
    env::set_var("SERVICE_DURATION_MINUTES", "90");
    env::set_var("OPENING_TIME", "09:30");
    env::set_var("CLOSING_TIME", "18:00");
    env::set_var("RETENTION_DAYS", "7");

    let config = Config::from_env().unwrap();

    assert_eq!(config.admin_user_id, 123456789);
    assert_eq!(config.database.url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(
        config.mode,
        BotMode::Webhook {
            url: "https://bot.example.com/webhook".to_string(),
            secret: "s3cret_token-1".to_string(),
        }
    );
    let relay = config.relay.unwrap();
    assert_eq!(relay.phone, "996700000000");
    assert_eq!(relay.endpoint, "https://api.callmebot.com/whatsapp.php");
    assert_eq!(config.schedule.utc_offset_hours, 3);
    assert_eq!(config.schedule.service_duration_minutes, 90);
    assert_eq!(config.schedule.opening_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    assert_eq!(config.schedule.retention_days, 7);

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));

    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_invalid_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();

    let cases = [
        ("HTTP_PORT", "invalid_port"),
        ("ADMIN_USER_ID", "admin"),
        ("BOT_MODE", "carrier-pigeon"),
        ("UTC_OFFSET_HOURS", "15"),
        ("SERVICE_DURATION_MINUTES", "0"),
        ("SERVICE_DURATION_MINUTES", "1441"),
        ("SERVICE_DURATION_MINUTES", "9223372036854775807"),
        ("OPENING_TIME", "8am"),
        ("RETENTION_DAYS", "-1"),
    ];

    for (key, value) in cases {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
        env::set_var(key, value);

        let result = Config::from_env();
        assert!(result.is_err(), "{key}={value} should be rejected");
    }

    clear_env();
}

#[test]
fn test_config_service_duration_bounds() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    env::set_var("SERVICE_DURATION_MINUTES", "1440");
    let config = Config::from_env().unwrap();
    assert_eq!(config.schedule.service_duration_minutes, 1440);

    env::set_var("SERVICE_DURATION_MINUTES", "100000000000000");
    let err = Config::from_env().unwrap_err();
    assert_eq!(err.to_string(), "Invalid SERVICE_DURATION_MINUTES");

    clear_env();
}

#[test]
fn test_config_opening_must_precede_closing() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("OPENING_TIME", "21:00");
    env::set_var("CLOSING_TIME", "08:00");

    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_webhook_mode_requires_url_and_secret() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("BOT_MODE", "webhook");

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("WEBHOOK_URL"));

    env::set_var("WEBHOOK_URL", "https://bot.example.com/webhook");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("WEBHOOK_SECRET"));

    env::set_var("WEBHOOK_SECRET", "has spaces");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_relay_needs_both_phone_and_key() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("WHATSAPP_PHONE", "996700000000");

    assert!(Config::from_env().unwrap().relay.is_none());

    env::set_var("WHATSAPP_API_KEY", "key");
    env::set_var("WHATSAPP_RELAY_URL", "https://relay.example.com/send");
    let relay = Config::from_env().unwrap().relay.unwrap();
    assert_eq!(relay.endpoint, "https://relay.example.com/send");

    clear_env();
}
