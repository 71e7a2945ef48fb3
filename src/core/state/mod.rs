//! Run state: watermark, run records and audit rows

pub mod manager;
pub mod run;

pub use manager::{RunOutcome, RunStateManager};
pub use run::{truncate_message, AuditEntry, RunCounts, RunRecord, RunStatus};
