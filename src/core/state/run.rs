//! Run bookkeeping models
//!
//! A [`RunRecord`] is opened when a reconciliation starts and closed when it
//! ends. Only runs closed with [`RunStatus::Success`] move the watermark.
//! An [`AuditEntry`] is the independent per-run summary row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Opened and not yet closed, or interrupted
    Running,
    Success,
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => f.write_str("running"),
            RunStatus::Success => f.write_str("success"),
            RunStatus::Error => f.write_str("error"),
        }
    }
}

/// Rows actually inserted by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub admissions: usize,
    pub stays: usize,
    pub exams: usize,
}

impl RunCounts {
    pub fn total(&self) -> usize {
        self.admissions + self.stays + self.exams
    }
}

/// One reconciliation execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub counts: RunCounts,
    pub error_message: Option<String>,
}

impl RunRecord {
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

/// Secondary audit row, written even when closing the run record fails
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub executed_at: DateTime<Utc>,
    pub counts: RunCounts,
    pub duration: Duration,
    pub status: RunStatus,
    pub message: Option<String>,
}

/// Shortens a message to at most `max_len` characters
pub fn truncate_message(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(max_len.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
