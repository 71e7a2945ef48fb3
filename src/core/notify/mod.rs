//! Notifier contract
//!
//! A notifier renders one record, submits it and reports what was sent, what
//! came back and how the acknowledgement was interpreted. It never fails:
//! every problem is folded into [`AckResult::TransportError`] so the caller
//! can record it against the notification log row.

pub mod hl7;

pub use hl7::Hl7Notifier;

use crate::core::reconcile::normalize_instant;
use crate::domain::notification::{AckResult, NotificationTarget};
use crate::domain::records::{Bed, ExamResult};
use async_trait::async_trait;
use chrono::SecondsFormat;

/// The record being announced
#[derive(Debug, Clone, Copy)]
pub enum NotificationSubject<'a> {
    Exam(&'a ExamResult),
    Bed(&'a Bed),
}

impl NotificationSubject<'_> {
    pub fn target(&self) -> NotificationTarget {
        match self {
            NotificationSubject::Exam(_) => NotificationTarget::Exam,
            NotificationSubject::Bed(_) => NotificationTarget::Bed,
        }
    }

    /// Natural key rendered as text, stored on the notification log row
    pub fn entity_id(&self) -> String {
        match self {
            NotificationSubject::Exam(exam) => format!(
                "{}/{}/{}",
                exam.stay_id,
                exam.exam_code.trim(),
                normalize_instant(&exam.collected_at).to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            NotificationSubject::Bed(bed) => bed.bed_id.to_string(),
        }
    }
}

/// Outcome of one notification attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Rendered payload
    pub message: String,
    /// Raw response body, if the endpoint answered at all
    pub response: Option<String>,
    pub ack: AckResult,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Renders and submits `subject`, embedding `correlation_id` in the message
    async fn notify(&self, correlation_id: i64, subject: NotificationSubject<'_>) -> Delivery;
}
