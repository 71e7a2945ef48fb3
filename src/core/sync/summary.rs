//! Run summaries and reporting

use crate::core::state::run::{RunCounts, RunStatus};
use crate::domain::{EntityKind, SyncError};
use std::time::Duration;

/// A record that was detected but not persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub entity: EntityKind,
    pub key: String,
    pub reason: String,
}

impl RecordFailure {
    pub fn new(entity: EntityKind, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Exit codes shared by the reconcile commands
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const RECORD_FAILURES: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
}

/// Maps a run-fatal error onto its exit code
pub fn fatal_exit_code(error: &SyncError) -> i32 {
    match error {
        SyncError::Configuration(_) => exit_code::CONFIGURATION,
        SyncError::Connection(_) => exit_code::CONNECTION,
        _ => exit_code::FATAL,
    }
}

/// Summary of an admissions/stays/exams run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub run_id: Option<i64>,
    pub dry_run: bool,

    /// Watermark used for the reads, `None` for a full refresh
    pub since: Option<chrono::DateTime<chrono::Utc>>,

    /// New records found by the diff
    pub detected: RunCounts,

    /// Rows actually inserted
    pub written: RunCounts,

    /// Exams whose notification came back accepted
    pub exams_accepted: usize,

    pub failures: Vec<RecordFailure>,

    /// Error that aborted the run
    pub fatal: Option<SyncError>,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Only a run with no failures at all may move the watermark
    pub fn status(&self) -> RunStatus {
        if self.fatal.is_none() && self.failures.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Error
        }
    }

    /// Message stored on the run and audit rows
    pub fn status_message(&self) -> Option<String> {
        match (&self.fatal, self.failures.len()) {
            (Some(fatal), 0) => Some(fatal.to_string()),
            (Some(fatal), n) => Some(format!("{fatal}; {n} record(s) not persisted")),
            (None, 0) => None,
            (None, n) => Some(describe_failures(&self.failures, n)),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match &self.fatal {
            Some(error) => fatal_exit_code(error),
            None if !self.failures.is_empty() => exit_code::RECORD_FAILURES,
            None => exit_code::SUCCESS,
        }
    }

    pub fn log_summary(&self) {
        crate::log_run_complete!(
            "admissions",
            self.written.total(),
            self.failures.len(),
            self.duration
        );
        tracing::info!(
            run_id = ?self.run_id,
            dry_run = self.dry_run,
            new_admissions = self.detected.admissions,
            new_stays = self.detected.stays,
            new_exams = self.detected.exams,
            inserted_admissions = self.written.admissions,
            inserted_stays = self.written.stays,
            inserted_exams = self.written.exams,
            exams_accepted = self.exams_accepted,
            status = %self.status(),
            "Run summary"
        );
        log_failures(&self.failures, self.fatal.as_ref());
    }
}

/// Summary of a bed run
#[derive(Debug, Default)]
pub struct BedSummary {
    pub dry_run: bool,
    pub detected_new: usize,
    pub detected_changed: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Beds announced and accepted by the receiver
    pub notified: usize,
    pub failures: Vec<RecordFailure>,
    pub fatal: Option<SyncError>,
    pub duration: Duration,
}

impl BedSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn is_successful(&self) -> bool {
        self.fatal.is_none() && self.failures.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        match &self.fatal {
            Some(error) => fatal_exit_code(error),
            None if !self.failures.is_empty() => exit_code::RECORD_FAILURES,
            None => exit_code::SUCCESS,
        }
    }

    pub fn log_summary(&self) {
        crate::log_run_complete!(
            "beds",
            self.inserted + self.updated,
            self.failures.len(),
            self.duration
        );
        tracing::info!(
            dry_run = self.dry_run,
            new_beds = self.detected_new,
            changed_beds = self.detected_changed,
            inserted = self.inserted,
            updated = self.updated,
            notified = self.notified,
            "Bed summary"
        );
        log_failures(&self.failures, self.fatal.as_ref());
    }
}

fn describe_failures(failures: &[RecordFailure], count: usize) -> String {
    let first = failures
        .iter()
        .take(3)
        .map(|f| format!("{} {}: {}", f.entity, f.key, f.reason))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{count} record(s) not persisted: {first}")
}

fn log_failures(failures: &[RecordFailure], fatal: Option<&SyncError>) {
    if let Some(error) = fatal {
        tracing::error!(error = %error, "Run aborted");
    }
    if !failures.is_empty() {
        tracing::warn!(
            failure_count = failures.len(),
            "Run completed with record failures"
        );
    }
}
