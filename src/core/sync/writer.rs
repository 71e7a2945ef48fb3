//! Record writer
//!
//! Admissions and stays are inserted unconditionally. Exams and beds go
//! through [`RecordWriter::deliver`] first and are only persisted when the
//! receiver answered `AA`.

use crate::adapters::database::traits::DestinationStore;
use crate::core::notify::{NotificationSubject, Notifier};
use crate::core::reconcile::Keyed;
use crate::core::sync::summary::RecordFailure;
use crate::domain::notification::{AckResult, NotificationStatus};
use crate::domain::records::{Admission, Bed, ExamResult, Stay};
use crate::domain::{EntityKind, SyncError};
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;

/// Result of writing an unconditional batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    /// Rows actually inserted
    pub inserted: usize,
    /// Rows whose key already existed
    pub already_present: usize,
    pub failures: Vec<RecordFailure>,
}

impl WriteReport {
    fn add_failure(&mut self, entity: EntityKind, key: String, error: &SyncError) {
        crate::log_record_failure!(entity, key, error);
        self.failures.push(RecordFailure::new(entity, key, error.to_string()));
    }
}

/// Lifecycle end state of one gated record
#[derive(Debug)]
pub enum RecordOutcome {
    /// Inserted or updated in the destination
    Persisted,
    /// Accepted, but the destination already had the key
    AlreadyPresent,
    /// The receiver did not answer `AA`; nothing was written
    NotAccepted(AckResult),
    /// The write or the notification bookkeeping failed
    Failed(SyncError),
}

impl RecordOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, RecordOutcome::Persisted)
    }

    /// Failure description, `None` for successful outcomes
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            RecordOutcome::Persisted | RecordOutcome::AlreadyPresent => None,
            RecordOutcome::NotAccepted(ack) => Some(format!("not accepted: {ack}")),
            RecordOutcome::Failed(error) => Some(error.to_string()),
        }
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOutcome::Persisted => f.write_str("persisted"),
            RecordOutcome::AlreadyPresent => f.write_str("already present"),
            RecordOutcome::NotAccepted(ack) => write!(f, "not accepted ({ack})"),
            RecordOutcome::Failed(error) => write!(f, "failed ({error})"),
        }
    }
}

/// Persists reconciled records into the destination
pub struct RecordWriter {
    destination: Arc<dyn DestinationStore>,
    notifier: Arc<dyn Notifier>,
}

impl RecordWriter {
    pub fn new(destination: Arc<dyn DestinationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            destination,
            notifier,
        }
    }

    /// Inserts every admission, continuing past failures
    pub async fn write_admissions(&self, admissions: &[Admission]) -> WriteReport {
        let mut report = WriteReport::default();
        for admission in admissions {
            match self.destination.insert_admission(admission).await {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.already_present += 1,
                Err(e) => report.add_failure(
                    EntityKind::Admission,
                    admission.key().to_string(),
                    &e,
                ),
            }
        }
        report
    }

    /// Inserts every stay, continuing past failures
    pub async fn write_stays(&self, stays: &[Stay]) -> WriteReport {
        let mut report = WriteReport::default();
        for stay in stays {
            match self.destination.insert_stay(stay).await {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.already_present += 1,
                Err(e) => report.add_failure(EntityKind::Stay, stay_label(stay), &e),
            }
        }
        report
    }

    /// Announces an exam and inserts it once accepted
    pub async fn write_exam(&self, exam: &ExamResult) -> RecordOutcome {
        let ack = match self.deliver(NotificationSubject::Exam(exam)).await {
            Ok(ack) => ack,
            Err(e) => return RecordOutcome::Failed(e),
        };
        if !ack.is_accepted() {
            return RecordOutcome::NotAccepted(ack);
        }

        match self.destination.insert_exam(exam).await {
            Ok(true) => RecordOutcome::Persisted,
            Ok(false) => RecordOutcome::AlreadyPresent,
            Err(e) => RecordOutcome::Failed(e),
        }
    }

    /// Inserts a bed seen for the first time
    ///
    /// Active beds are announced and gated on the acknowledgement; inactive
    /// beds are inserted without notification.
    pub async fn write_bed(&self, bed: &Bed) -> RecordOutcome {
        if bed.status.is_active() {
            let ack = match self.deliver(NotificationSubject::Bed(bed)).await {
                Ok(ack) => ack,
                Err(e) => return RecordOutcome::Failed(e),
            };
            if !ack.is_accepted() {
                return RecordOutcome::NotAccepted(ack);
            }
        } else {
            tracing::debug!(bed_id = %bed.bed_id, "Inserting inactive bed without notification");
        }

        match self.destination.insert_bed(bed).await {
            Ok(true) => RecordOutcome::Persisted,
            Ok(false) => RecordOutcome::AlreadyPresent,
            Err(e) => RecordOutcome::Failed(e),
        }
    }

    /// Announces a status transition and applies it once accepted
    pub async fn update_bed_status(&self, bed: &Bed) -> RecordOutcome {
        let ack = match self.deliver(NotificationSubject::Bed(bed)).await {
            Ok(ack) => ack,
            Err(e) => return RecordOutcome::Failed(e),
        };
        if !ack.is_accepted() {
            return RecordOutcome::NotAccepted(ack);
        }

        match self.destination.update_bed_status(bed, bed.status).await {
            Ok(()) => RecordOutcome::Persisted,
            Err(e) => RecordOutcome::Failed(e),
        }
    }

    /// Opens the log row, notifies and records the response
    ///
    /// The log row id is the message correlation id, so nothing is sent when
    /// the row cannot be created. A failure to close the row is logged only.
    async fn deliver(&self, subject: NotificationSubject<'_>) -> Result<AckResult, SyncError> {
        let target = subject.target();
        let entity_id = subject.entity_id();

        let log_id = self
            .destination
            .open_notification(target, &entity_id)
            .await?;

        let delivery = self.notifier.notify(log_id, subject).await;

        let status = if delivery.response.is_some() {
            NotificationStatus::Sent
        } else {
            NotificationStatus::Error
        };
        if let Err(e) = self
            .destination
            .close_notification(
                target,
                log_id,
                status,
                &delivery.message,
                delivery.response.as_deref(),
            )
            .await
        {
            tracing::error!(log_id, entity_id = %entity_id, error = %e, "Failed to close notification log");
        }

        tracing::info!(
            log_id,
            target = ?target,
            entity_id = %entity_id,
            ack = %delivery.ack,
            "Notification sent"
        );
        Ok(delivery.ack)
    }
}

/// Natural key of a stay rendered for logs and failure lists
pub fn stay_label(stay: &Stay) -> String {
    let key = stay.key();
    format!(
        "{}/{}/{}/{}",
        key.admission_number,
        key.unit_code,
        key.bed_code,
        key.unit_admission_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
