//! # Structured Logging Module
//!
//! Environment-aware structured logging for the booking core, plus helpers
//! that give every booking, store and ledger operation the same field layout.

use std::sync::OnceLock;
use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

use crate::config::StudioConfig;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if use_json_format() {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, reusing it");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("STUDIO_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn use_json_format() -> bool {
    std::env::var("STUDIO_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"))
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for booking lifecycle operations
pub fn log_booking_operation(
    operation: &str,
    booking_id: Option<Uuid>,
    room_id: Option<Uuid>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        booking_id = ?booking_id,
        room_id = ?room_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "BOOKING_OPERATION"
    );
}

/// Log structured data for document store operations
pub fn log_store_operation(
    operation: &str,
    path: &str,
    status: &str,
    duration_ms: Option<u64>,
    details: Option<&str>,
) {
    tracing::debug!(
        operation = %operation,
        path = %path,
        status = %status,
        duration_ms = duration_ms,
        details = details,
        "STORE_OPERATION"
    );
}

/// Log structured data for external event ledger operations
pub fn log_ledger_operation(operation: &str, event_id: &str, event_type: &str, status: &str) {
    tracing::info!(
        operation = %operation,
        event_id = %event_id,
        event_type = %event_type,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "LEDGER_OPERATION"
    );
}

/// Log the effective configuration once it has been loaded and validated
pub fn log_config_loaded(environment: &str, config: &StudioConfig) {
    tracing::info!(
        environment = %environment,
        store_path = %config.store.path.display(),
        cleaning_buffer_days = config.booking.cleaning_buffer_days,
        min_booking_days = config.booking.min_booking_days,
        cache_enabled = config.cache.enabled,
        "Configuration loaded successfully"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
