//! Reconciliation diff engine
//!
//! Pure functions from a source snapshot and a destination snapshot to the
//! set of records the destination is missing. Every entity kind goes through
//! the same [`diff`] over its [`Keyed`] natural key; beds additionally use a
//! status change detector.

pub mod diff;
pub mod keys;

pub use diff::{
    diff, diff_admissions, diff_beds, diff_exams, diff_stays, diff_with_changes, Delta,
};
pub use keys::{normalize_instant, ExamKey, Keyed, StayKey};
