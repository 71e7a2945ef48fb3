//! Run orchestration
//!
//! - [`ReconcileCoordinator`]: admissions, stays and exams, with watermark
//!   and audit bookkeeping
//! - [`BedCoordinator`]: full-table bed reconciliation
//! - [`RecordWriter`]: idempotent inserts and acknowledgement-gated writes

pub mod beds;
pub mod coordinator;
pub mod summary;
pub mod writer;

pub use beds::BedCoordinator;
pub use coordinator::{ReconcileCoordinator, ReconcileOptions, ReconcilePlan};
pub use summary::{exit_code, BedSummary, RecordFailure, RunSummary};
pub use writer::{RecordOutcome, RecordWriter, WriteReport};
