use tracing::{error, info, warn, debug};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: {} by {}({}) - {}", command, user, user_id, d),
        None => info!("CMD_START: {} by {}({})", command, user, user_id),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user: &str, user_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: {} by {}({}) - {}", command, user, user_id, d),
        None => info!("CMD_SUCCESS: {} by {}({})", command, user, user_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user: &str, user_id: i64, error: &str) {
    error!("CMD_ERROR: {} by {}({}) - {}", command, user, user_id, error);
}

/// Logs a delivered alert
pub fn log_alert_sent(kind: &str, user_id: i64, bucket_key: &str) {
    info!("ALERT_SENT: {} to user {} for bucket {}", kind, user_id, bucket_key);
}

/// Logs an alert that was evaluated but not delivered
pub fn log_alert_skipped(kind: &str, user_id: i64, reason: &str) {
    debug!("ALERT_SKIPPED: {} for user {} - {}", kind, user_id, reason);
}

/// Logs weather provider failures; the affected user is skipped for the cycle
pub fn log_provider_error(operation: &str, user_id: i64, error: &str) {
    warn!("PROVIDER_ERROR: {} for user {} failed: {}", operation, user_id, error);
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str) {
    error!("DB_ERROR: {} on {} failed: {}", operation, table, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
