//! Domain error types
//!
//! The error taxonomy separates run-fatal failures (configuration, reads)
//! from per-record failures (writes, notifications) and best-effort audit
//! failures. Third-party error types never leak through these variants.

use std::fmt;
use thiserror::Error;

/// Entity kinds handled by a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Admission,
    Stay,
    Exam,
    Bed,
    NotificationLog,
    RunRecord,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Admission => "admission",
            EntityKind::Stay => "stay",
            EntityKind::Exam => "exam",
            EntityKind::Bed => "bed",
            EntityKind::NotificationLog => "notification log",
            EntityKind::RunRecord => "run record",
        };
        f.write_str(name)
    }
}

/// Main ward-sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or invalid settings; always fatal and raised before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A source or destination query failed; aborts the run
    #[error("Failed to read {entity} records: {cause}")]
    Read { entity: EntityKind, cause: String },

    /// A single insert or update failed; the batch continues
    #[error("Failed to write {entity} {key}: {cause}")]
    Write {
        entity: EntityKind,
        key: String,
        cause: String,
    },

    /// The outbound transport failed for a single record
    #[error("Notification failed: {0}")]
    Notification(#[from] TransportError),

    /// Audit or notification-log bookkeeping failed
    #[error("Audit error: {0}")]
    Audit(String),

    /// Database-related errors (pool, statement setup)
    #[error("Database error: {0}")]
    Database(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Watermark and run-record errors
    #[error("State management error: {0}")]
    State(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Builds a read failure for the given entity
    pub fn read(entity: EntityKind, cause: impl fmt::Display) -> Self {
        SyncError::Read {
            entity,
            cause: cause.to_string(),
        }
    }

    /// Builds a write failure for the given entity and natural key
    pub fn write(entity: EntityKind, key: impl Into<String>, cause: impl fmt::Display) -> Self {
        SyncError::Write {
            entity,
            key: key.into(),
            cause: cause.to_string(),
        }
    }
}

/// Outbound transport errors
///
/// These never carry HTTP client types, only their rendered detail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be reached
    #[error("Failed to reach notification endpoint: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Notification request timed out: {0}")]
    Timeout(String),

    /// The endpoint answered with a non-2xx status
    #[error("Notification endpoint returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body could not be read or carried no acknowledgement
    #[error("Invalid acknowledgement response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether another attempt within the same run may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed(_) | TransportError::Timeout(_) => true,
            TransportError::HttpStatus { status, .. } => *status >= 500,
            TransportError::InvalidResponse(_) => false,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
