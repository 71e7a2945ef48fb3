//! Logging and observability
//!
//! This module provides structured logging with:
//! - human-readable console output mirroring every run
//! - JSON-formatted daily log files
//! - configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use ward_sync::logging::init_logging;
//! use ward_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a reconciliation run
///
/// # Example
///
/// ```no_run
/// use ward_sync::log_run_start;
///
/// log_run_start!("admissions", false);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run:expr, $dry_run:expr) => {
        tracing::info!(run = $run, dry_run = $dry_run, "Starting reconciliation");
    };
}

/// Log the completion of a reconciliation run
///
/// # Example
///
/// ```no_run
/// use ward_sync::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("beds", 3, 0, Duration::from_secs(2));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run:expr, $written:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            run = $run,
            written = $written,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Reconciliation completed"
        );
    };
}

/// Log a record that could not be written or was not accepted
///
/// # Example
///
/// ```no_run
/// use ward_sync::log_record_failure;
/// use ward_sync::domain::EntityKind;
///
/// log_record_failure!(EntityKind::Exam, "10/HGB/2025-01-10T09:30:00Z", "AR (unknown patient)");
/// ```
#[macro_export]
macro_rules! log_record_failure {
    ($entity:expr, $key:expr, $reason:expr) => {
        tracing::warn!(
            entity = %$entity,
            key = %$key,
            reason = %$reason,
            "Record not persisted"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use ward_sync::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(1, 2, Duration::from_millis(500), "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_retries:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_retries = $max_retries,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying notification"
        );
    };
}
