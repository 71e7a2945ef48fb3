//! Database abstraction traits
//!
//! The reconciliation core only talks to the two database systems through
//! these traits, so tests can substitute in-memory implementations.

use crate::core::state::run::{AuditEntry, RunCounts, RunRecord, RunStatus};
use crate::domain::notification::{NotificationStatus, NotificationTarget};
use crate::domain::records::{Admission, Bed, BedStatus, ExamResult, Stay};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only access to the source-of-record system
///
/// `since` is inclusive; `None` fetches everything. Failures are reported as
/// [`crate::domain::SyncError::Read`].
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn fetch_admissions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Admission>>;

    async fn fetch_stays(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Stay>>;

    /// Exams joined to stays by the configured collection window
    async fn fetch_exams(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ExamResult>>;

    /// Beds are always read in full
    async fn fetch_beds(&self) -> Result<Vec<Bed>>;
}

/// Reads and idempotent writes against the destination system
#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn fetch_admissions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Admission>>;

    async fn fetch_stays(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Stay>>;

    async fn fetch_exams(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ExamResult>>;

    async fn fetch_beds(&self) -> Result<Vec<Bed>>;

    /// Inserts an admission, returning `false` when its key already existed
    async fn insert_admission(&self, admission: &Admission) -> Result<bool>;

    async fn insert_stay(&self, stay: &Stay) -> Result<bool>;

    /// Inserts an exam inside its own transaction
    async fn insert_exam(&self, exam: &ExamResult) -> Result<bool>;

    async fn insert_bed(&self, bed: &Bed) -> Result<bool>;

    async fn update_bed_status(&self, bed: &Bed, status: BedStatus) -> Result<()>;

    /// Creates a pending notification log row and returns its id
    async fn open_notification(&self, target: NotificationTarget, entity_id: &str)
        -> Result<i64>;

    /// Records the rendered message and response on an existing log row
    async fn close_notification(
        &self,
        target: NotificationTarget,
        id: i64,
        status: NotificationStatus,
        message: &str,
        response: Option<&str>,
    ) -> Result<()>;
}

/// Watermark and audit persistence
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Start time of the newest run that ended in success
    async fn last_successful_run_start(&self) -> Result<Option<DateTime<Utc>>>;

    /// Opens a run record with status running
    async fn begin_run(&self, started_at: DateTime<Utc>) -> Result<i64>;

    async fn end_run(
        &self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
        error_message: Option<&str>,
    ) -> Result<()>;

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()>;

    /// Most recent run records, newest first
    async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>>;
}
