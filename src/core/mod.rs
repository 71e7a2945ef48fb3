//! Core business logic
//!
//! - `reconcile`: keyed diff engine
//! - `notify`: notifier contract and the HL7 notifier
//! - `sync`: writer and run orchestration
//! - `state`: watermark, run records and audit rows

pub mod notify;
pub mod reconcile;
pub mod state;
pub mod sync;
