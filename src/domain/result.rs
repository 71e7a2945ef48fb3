//! Result type alias for ward-sync
//!
//! Uses [`SyncError`] as the error type for every fallible domain operation.

use super::errors::SyncError;

/// Result type alias for ward-sync operations
///
/// # Examples
///
/// ```
/// use ward_sync::domain::result::Result;
/// use ward_sync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Configuration("notifier.endpoint is empty".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
