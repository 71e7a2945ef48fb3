//! Bed reconciliation
//!
//! Beds are always read in full and leave no run record behind. New beds
//! and status transitions are processed one at a time in source order.

use crate::adapters::database::traits::{DestinationStore, SourceReader};
use crate::core::reconcile::{diff_beds, Delta};
use crate::core::sync::summary::{BedSummary, RecordFailure};
use crate::core::sync::writer::{RecordOutcome, RecordWriter};
use crate::domain::records::Bed;
use crate::domain::{EntityKind, Result};
use std::sync::Arc;
use std::time::Instant;

pub struct BedCoordinator {
    source: Arc<dyn SourceReader>,
    destination: Arc<dyn DestinationStore>,
    writer: RecordWriter,
    dry_run: bool,
}

impl BedCoordinator {
    pub fn new(
        source: Arc<dyn SourceReader>,
        destination: Arc<dyn DestinationStore>,
        writer: RecordWriter,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            destination,
            writer,
            dry_run,
        }
    }

    pub async fn execute(&self) -> BedSummary {
        let clock = Instant::now();
        let mut summary = BedSummary::new(self.dry_run);

        crate::log_run_start!("beds", self.dry_run);

        match self.plan().await {
            Ok(delta) => {
                summary.detected_new = delta.new.len();
                summary.detected_changed = delta.changed.len();
                if self.dry_run {
                    log_dry_run(&delta);
                } else {
                    self.apply(&delta, &mut summary).await;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Bed reconciliation aborted");
                summary.fatal = Some(e);
            }
        }

        summary.duration = clock.elapsed();
        summary
    }

    /// Reads both bed tables and diffs them
    pub async fn plan(&self) -> Result<Delta<Bed>> {
        let source = self.source.fetch_beds().await?;
        let destination = self.destination.fetch_beds().await?;
        let delta = diff_beds(&source, &destination);

        tracing::info!(
            source_beds = source.len(),
            destination_beds = destination.len(),
            new_beds = delta.new.len(),
            changed_beds = delta.changed.len(),
            "Bed delta computed"
        );
        Ok(delta)
    }

    async fn apply(&self, delta: &Delta<Bed>, summary: &mut BedSummary) {
        for bed in &delta.new {
            let outcome = self.writer.write_bed(bed).await;
            if bed.status.is_active() && outcome.failure_reason().is_none() {
                summary.notified += 1;
            }
            if outcome.is_persisted() {
                summary.inserted += 1;
            }
            record_failure(bed, &outcome, summary);
        }

        for bed in &delta.changed {
            let outcome = self.writer.update_bed_status(bed).await;
            if outcome.is_persisted() {
                summary.notified += 1;
                summary.updated += 1;
            }
            record_failure(bed, &outcome, summary);
        }
    }
}

fn record_failure(bed: &Bed, outcome: &RecordOutcome, summary: &mut BedSummary) {
    if let Some(reason) = outcome.failure_reason() {
        crate::log_record_failure!(EntityKind::Bed, bed.bed_id, reason);
        summary
            .failures
            .push(RecordFailure::new(EntityKind::Bed, bed.bed_id.to_string(), reason));
    }
}

fn log_dry_run(delta: &Delta<Bed>) {
    for bed in &delta.new {
        let action = if bed.status.is_active() {
            "Would notify and insert bed"
        } else {
            "Would insert inactive bed"
        };
        tracing::info!(bed_id = %bed.bed_id, status = %bed.status, "{}", action);
    }
    for bed in &delta.changed {
        tracing::info!(
            bed_id = %bed.bed_id,
            status = %bed.status,
            "Would notify and update bed status"
        );
    }
}
