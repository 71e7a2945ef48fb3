//! Reconciliation coordinator - orchestrates one admissions/stays/exams run
//!
//! A run reads the watermark, opens a run record, fetches both snapshots,
//! diffs them and writes admissions, then stays, then acknowledged exams.
//! The run record is always closed and the audit row always appended, even
//! when a read aborts the run.

use crate::adapters::database::traits::{DestinationStore, SourceReader};
use crate::core::notify::NotificationSubject;
use crate::core::reconcile::{diff_admissions, diff_exams, diff_stays};
use crate::core::state::{RunOutcome, RunStateManager};
use crate::core::sync::summary::{RecordFailure, RunSummary};
use crate::core::sync::writer::{stay_label, RecordWriter};
use crate::domain::records::{Admission, ExamResult, Stay};
use crate::domain::{EntityKind, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Per-invocation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Read and diff only
    pub dry_run: bool,
    /// Ignore the watermark and read full tables
    pub full: bool,
}

/// Delta computed from one pair of snapshots
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub admissions: Vec<Admission>,
    pub stays: Vec<Stay>,
    pub exams: Vec<ExamResult>,
}

pub struct ReconcileCoordinator {
    source: Arc<dyn SourceReader>,
    destination: Arc<dyn DestinationStore>,
    state: RunStateManager,
    writer: RecordWriter,
    options: ReconcileOptions,
}

impl ReconcileCoordinator {
    pub fn new(
        source: Arc<dyn SourceReader>,
        destination: Arc<dyn DestinationStore>,
        state: RunStateManager,
        writer: RecordWriter,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            source,
            destination,
            state,
            writer,
            options,
        }
    }

    /// Execute one run
    ///
    /// Never returns an error: run-fatal failures end up in
    /// [`RunSummary::fatal`] after the run bookkeeping has been attempted.
    pub async fn execute(&self) -> RunSummary {
        let clock = Instant::now();
        let started_at = Utc::now();
        let mut summary = RunSummary::new(self.options.dry_run);

        crate::log_run_start!("admissions", self.options.dry_run);

        if self.options.dry_run {
            if let Err(e) = self.dry_run(&mut summary).await {
                summary.fatal = Some(e);
            }
            summary.duration = clock.elapsed();
            return summary;
        }

        let run_id = match self.state.begin_run(started_at).await {
            Ok(id) => Some(id),
            Err(e) => {
                summary.fatal = Some(e);
                None
            }
        };
        summary.run_id = run_id;

        if summary.fatal.is_none() {
            if let Err(e) = self.reconcile(&mut summary).await {
                tracing::error!(error = %e, "Reconciliation aborted");
                summary.fatal = Some(e);
            }
        }

        summary.duration = clock.elapsed();
        let outcome = RunOutcome {
            status: summary.status(),
            counts: summary.written,
            message: summary.status_message(),
            duration: summary.duration,
        };
        self.state.finish_run(run_id, &outcome).await;

        summary
    }

    async fn reconcile(&self, summary: &mut RunSummary) -> Result<()> {
        let since = self.since().await?;
        summary.since = since;

        let plan = self.plan(since).await?;
        summary.detected.admissions = plan.admissions.len();
        summary.detected.stays = plan.stays.len();
        summary.detected.exams = plan.exams.len();

        let admissions = self.writer.write_admissions(&plan.admissions).await;
        summary.written.admissions = admissions.inserted;
        summary.failures.extend(admissions.failures);

        let stays = self.writer.write_stays(&plan.stays).await;
        summary.written.stays = stays.inserted;
        summary.failures.extend(stays.failures);

        for exam in &plan.exams {
            let outcome = self.writer.write_exam(exam).await;
            match outcome.failure_reason() {
                None => {
                    summary.exams_accepted += 1;
                    if outcome.is_persisted() {
                        summary.written.exams += 1;
                    }
                }
                Some(reason) => {
                    let key = NotificationSubject::Exam(exam).entity_id();
                    crate::log_record_failure!(EntityKind::Exam, key, reason);
                    summary
                        .failures
                        .push(RecordFailure::new(EntityKind::Exam, key, reason));
                }
            }
        }

        Ok(())
    }

    async fn dry_run(&self, summary: &mut RunSummary) -> Result<()> {
        let since = self.since().await?;
        summary.since = since;

        let plan = self.plan(since).await?;
        summary.detected.admissions = plan.admissions.len();
        summary.detected.stays = plan.stays.len();
        summary.detected.exams = plan.exams.len();

        for admission in &plan.admissions {
            tracing::info!(
                admission_number = %admission.admission_number,
                "Would insert admission"
            );
        }
        for stay in &plan.stays {
            tracing::info!(stay = %stay_label(stay), "Would insert stay");
        }
        for exam in &plan.exams {
            tracing::info!(
                exam = %NotificationSubject::Exam(exam).entity_id(),
                "Would notify and insert exam"
            );
        }
        Ok(())
    }

    async fn since(&self) -> Result<Option<DateTime<Utc>>> {
        if self.options.full {
            tracing::info!("Full refresh requested, ignoring watermark");
            return Ok(None);
        }
        let watermark = self.state.watermark().await?;
        tracing::info!(watermark = %watermark, "Using watermark");
        Ok(Some(watermark))
    }

    /// Fetches both snapshots and diffs them
    ///
    /// Any read failure aborts the plan.
    pub async fn plan(&self, since: Option<DateTime<Utc>>) -> Result<ReconcilePlan> {
        let src_admissions = self.source.fetch_admissions(since).await?;
        let dst_admissions = self.destination.fetch_admissions(since).await?;
        let src_stays = self.source.fetch_stays(since).await?;
        let dst_stays = self.destination.fetch_stays(since).await?;
        let src_exams = self.source.fetch_exams(since).await?;
        let dst_exams = self.destination.fetch_exams(since).await?;

        tracing::debug!(
            source_admissions = src_admissions.len(),
            source_stays = src_stays.len(),
            source_exams = src_exams.len(),
            "Snapshots fetched"
        );

        let plan = ReconcilePlan {
            admissions: diff_admissions(&src_admissions, &dst_admissions),
            stays: diff_stays(&src_stays, &dst_stays),
            exams: diff_exams(&src_exams, &dst_exams),
        };

        tracing::info!(
            new_admissions = plan.admissions.len(),
            new_stays = plan.stays.len(),
            new_exams = plan.exams.len(),
            "Delta computed"
        );
        Ok(plan)
    }
}
