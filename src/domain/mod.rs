//! Domain models and types for ward-sync.
//!
//! The domain layer provides:
//! - **Natural identifiers** ([`AdmissionNumber`], [`BedId`])
//! - **Record types** ([`Admission`], [`Stay`], [`ExamResult`], [`Bed`])
//! - **Notification types** ([`NotificationLog`], [`AckResult`])
//! - **Error types** ([`SyncError`], [`TransportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! ```rust
//! use ward_sync::domain::{EntityKind, Result, SyncError};
//!
//! fn fetch() -> Result<()> {
//!     Err(SyncError::read(EntityKind::Admission, "connection reset"))
//! }
//!
//! assert!(matches!(fetch(), Err(SyncError::Read { .. })));
//! ```

pub mod errors;
pub mod ids;
pub mod notification;
pub mod records;
pub mod result;

pub use errors::{EntityKind, SyncError, TransportError};
pub use ids::{AdmissionNumber, BedId};
pub use notification::{AckResult, NotificationLog, NotificationStatus, NotificationTarget};
pub use records::{Admission, Bed, BedStatus, BedType, ExamResult, Stay};
pub use result::Result;
