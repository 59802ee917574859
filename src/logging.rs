// src/logging.rs

use crate::models::ApiCallLog;
use env_logger::{Builder, Env};

/// Installs the global logger. `RUST_LOG` takes precedence over `default_level`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(default_level: &str) {
    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

/// Renders one API call as a single log line.
pub fn format_api_call(log: &ApiCallLog) -> String {
    let status = log
        .response_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        status,
        log.response_time_ms
    )
}

/// Logs an API call; failed or missing statuses are logged as warnings.
pub fn log_api_call(log: &ApiCallLog) {
    let line = format_api_call(log);
    match log.response_status {
        Some(status) if (200..300).contains(&status) => log::info!("{}", line),
        _ => log::warn!("{}", line),
    }
}
