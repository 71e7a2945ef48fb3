//! Outbound notification records and acknowledgement outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of record a notification announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTarget {
    Exam,
    Bed,
}

/// Lifecycle of a notification log row
///
/// Rows are created `Pending` before transmission and moved to `Sent` once
/// any response came back (whatever the acknowledgement said) or to `Error`
/// when the transport produced no response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Error,
}

/// One outbound message attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    /// Correlation id embedded in the rendered message
    pub id: i64,
    pub target: NotificationTarget,
    pub target_entity_id: String,
    pub sent_at: DateTime<Utc>,
    pub status: NotificationStatus,
    pub message: Option<String>,
    pub response: Option<String>,
}

/// Normalised acknowledgement returned by the external clinical system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckResult {
    /// `AA`: the message was accepted
    Accepted,
    /// `AE`: the receiver hit an application error
    ApplicationError(String),
    /// `AR`: the receiver rejected the message
    Rejected(String),
    /// No usable acknowledgement (network failure, non-2xx, unparseable body)
    TransportError(String),
}

impl AckResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AckResult::Accepted)
    }

    /// Short code used in logs and summaries
    pub fn code(&self) -> &'static str {
        match self {
            AckResult::Accepted => "AA",
            AckResult::ApplicationError(_) => "AE",
            AckResult::Rejected(_) => "AR",
            AckResult::TransportError(_) => "TRANSPORT",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            AckResult::Accepted => None,
            AckResult::ApplicationError(d)
            | AckResult::Rejected(d)
            | AckResult::TransportError(d) => Some(d),
        }
    }
}

impl fmt::Display for AckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) if !detail.is_empty() => write!(f, "{} ({})", self.code(), detail),
            _ => f.write_str(self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_result_display() {
        assert_eq!(AckResult::Accepted.to_string(), "AA");
        assert_eq!(
            AckResult::Rejected("unknown bed".to_string()).to_string(),
            "AR (unknown bed)"
        );
        assert_eq!(AckResult::ApplicationError(String::new()).to_string(), "AE");
    }

    #[test]
    fn test_only_aa_is_accepted() {
        assert!(AckResult::Accepted.is_accepted());
        assert!(!AckResult::ApplicationError("x".into()).is_accepted());
        assert!(!AckResult::Rejected("x".into()).is_accepted());
        assert!(!AckResult::TransportError("x".into()).is_accepted());
    }
}
