//! # Structured Logging Module
//!
//! Environment-aware structured logging for batch runs. Console output is either
//! human readable or JSON, and the filter honours `RUST_LOG` when set.

use crate::config::{detect_environment, LogFormat};
use crate::constants::events;
use crate::error::ItemError;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging(format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .boxed(),
        };

        // An embedding application may already own the global subscriber
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            format = ?format,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

/// Log structured data for a batch lifecycle event
pub fn log_batch_operation(
    operation: &str,
    batch_id: Uuid,
    total: usize,
    processed: usize,
    skipped: usize,
    failed: usize,
    duration_ms: Option<u64>,
) {
    tracing::info!(
        operation = %operation,
        batch_id = %batch_id,
        total = total,
        processed = processed,
        skipped = skipped,
        failed = failed,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "BATCH_OPERATION"
    );
}

/// Log an isolated per-record failure
pub fn log_item_failure(batch_id: Uuid, error: &ItemError) {
    tracing::warn!(
        operation = events::ITEM_FAILED,
        batch_id = %batch_id,
        record_id = error.record_id(),
        error_code = error.code(),
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "ITEM_FAILURE"
    );
}
