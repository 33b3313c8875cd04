use tracing::{debug, error, info, warn};

use crate::services::session_store::Step;

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: {} by {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_START: {} by {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs a conversation step that accepted the user's answer
pub fn log_step_advanced(from: Step, to: Step, user_id: i64) {
    debug!("STEP: user {} moved from {:?} to {:?}", user_id, from, to);
}

/// Logs validation errors with consistent format
pub fn log_validation_error(step: &str, value: &str, error: &str, user_id: i64) {
    warn!(
        "VALIDATION_ERROR: {} value '{}' invalid: {} - user {}",
        step, value, error, user_id
    );
}

/// Logs access attempts to admin-only commands
pub fn log_access_denied(command: &str, user_id: i64) {
    warn!("ACCESS_DENIED: {} by {}", command, user_id);
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
