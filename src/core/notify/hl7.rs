//! HL7 notifier built on a [`Transport`]

use super::{Delivery, NotificationSubject, Notifier};
use crate::adapters::hl7::{parse_ack, MessageRenderer, Transport};
use crate::domain::errors::TransportError;
use crate::domain::notification::AckResult;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct Hl7Notifier {
    renderer: MessageRenderer,
    transport: Arc<dyn Transport>,
}

impl Hl7Notifier {
    pub fn new(renderer: MessageRenderer, transport: Arc<dyn Transport>) -> Self {
        Self {
            renderer,
            transport,
        }
    }

    fn render(&self, correlation_id: i64, subject: NotificationSubject<'_>) -> String {
        let now = Utc::now();
        match subject {
            NotificationSubject::Exam(exam) => self.renderer.render_exam(correlation_id, exam, &now),
            NotificationSubject::Bed(bed) => self.renderer.render_bed(correlation_id, bed, &now),
        }
    }
}

#[async_trait]
impl Notifier for Hl7Notifier {
    async fn notify(&self, correlation_id: i64, subject: NotificationSubject<'_>) -> Delivery {
        let message = self.render(correlation_id, subject);

        let (response, ack) = match self.transport.submit(&message).await {
            Ok(body) => {
                let ack = parse_ack(&body);
                (Some(body), ack)
            }
            // The endpoint answered, so keep its body for the audit trail
            Err(TransportError::HttpStatus { status, body }) => {
                let err = TransportError::HttpStatus {
                    status,
                    body: body.clone(),
                };
                (Some(body), AckResult::TransportError(err.to_string()))
            }
            Err(e) => (None, AckResult::TransportError(e.to_string())),
        };

        tracing::debug!(
            correlation_id,
            target = ?subject.target(),
            ack = %ack,
            "Notification acknowledged"
        );

        Delivery {
            message,
            response,
            ack,
        }
    }
}
