//! Run state manager
//!
//! Wraps a [`RunStore`] with the watermark fallback and the guaranteed
//! close-and-audit sequence that ends every run.

use crate::adapters::database::traits::RunStore;
use crate::core::state::run::{truncate_message, AuditEntry, RunCounts, RunRecord, RunStatus};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a run as reported to [`RunStateManager::finish_run`]
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub counts: RunCounts,
    pub message: Option<String>,
    pub duration: Duration,
}

/// Watermark and audit bookkeeping for reconciliation runs
pub struct RunStateManager {
    store: Arc<dyn RunStore>,
    bootstrap_epoch: DateTime<Utc>,
    max_message_len: usize,
}

impl RunStateManager {
    pub fn new(
        store: Arc<dyn RunStore>,
        bootstrap_epoch: DateTime<Utc>,
        max_message_len: usize,
    ) -> Self {
        Self {
            store,
            bootstrap_epoch,
            max_message_len,
        }
    }

    /// Start of the last successful run, or the bootstrap epoch
    ///
    /// # Errors
    ///
    /// Returns a state error if the run table cannot be read.
    pub async fn watermark(&self) -> Result<DateTime<Utc>> {
        Ok(self
            .store
            .last_successful_run_start()
            .await?
            .unwrap_or(self.bootstrap_epoch))
    }

    /// Opens a run record with status running
    pub async fn begin_run(&self, started_at: DateTime<Utc>) -> Result<i64> {
        let run_id = self.store.begin_run(started_at).await?;
        tracing::debug!(run_id, started_at = %started_at, "Run record opened");
        Ok(run_id)
    }

    /// Closes the run record (when one was opened) and appends the audit row
    ///
    /// The audit row is written even when closing the run record fails.
    /// Bookkeeping failures are logged, never returned; the result is the
    /// number of failed bookkeeping writes.
    pub async fn finish_run(&self, run_id: Option<i64>, outcome: &RunOutcome) -> usize {
        let message = outcome
            .message
            .as_deref()
            .map(|m| truncate_message(m, self.max_message_len));
        let mut failures = 0;

        if let Some(run_id) = run_id {
            if let Err(e) = self
                .store
                .end_run(run_id, outcome.status, &outcome.counts, message.as_deref())
                .await
            {
                failures += 1;
                tracing::error!(run_id, error = %e, "Failed to close run record");
            }
        }

        let entry = AuditEntry {
            executed_at: Utc::now(),
            counts: outcome.counts,
            duration: outcome.duration,
            status: outcome.status,
            message,
        };
        if let Err(e) = self.store.append_audit(&entry).await {
            failures += 1;
            tracing::error!(error = %e, "Failed to append audit row");
        }

        failures
    }

    /// Most recent runs, newest first
    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        self.store.recent_runs(limit).await
    }
}
