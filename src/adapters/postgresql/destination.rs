//! Destination database: reads, idempotent inserts and notification logs

use super::client::PostgreSQLClient;
use super::models::{
    admission_from_row, bed_from_row, exam_from_row, notification_status_code, stay_from_row,
};
use crate::adapters::database::traits::DestinationStore;
use crate::core::notify::NotificationSubject;
use crate::core::sync::writer::stay_label;
use crate::domain::notification::{NotificationStatus, NotificationTarget};
use crate::domain::records::{Admission, Bed, BedStatus, ExamResult, Stay};
use crate::domain::{EntityKind, Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const ADMISSIONS_QUERY: &str = "
    SELECT hospitaladmissionnumber::varchar AS admission_number,
           medicalrecord::varchar AS patient_record_id,
           hospitaladmissiondate::timestamptz AS admission_date,
           medicaldischarge::timestamptz AS discharge_date
    FROM internacoes
    WHERE $1::timestamptz IS NULL OR hospitaladmissiondate >= $1::timestamptz";

const STAYS_QUERY: &str = "
    SELECT id::bigint AS id,
           hospitaladmissionnumber::varchar AS admission_number,
           unitcode::varchar AS unit_code,
           bedcode::varchar AS bed_code,
           unitadmissiondatetime::timestamptz AS unit_admission_at
    FROM admissoes
    WHERE $1::timestamptz IS NULL OR unitadmissiondatetime >= $1::timestamptz";

const EXAMS_QUERY: &str = "
    SELECT adm_id::bigint AS stay_id,
           NULL::varchar AS admission_number,
           NULL::varchar AS patient_record_id,
           idexame::varchar AS exam_code,
           dthrexame::timestamptz AS collected_at,
           descricao_usual::varchar AS description,
           valor::varchar AS value,
           tipo_inf_valor::varchar AS value_type,
           result_sigla_exa::varchar AS result_flag_code,
           result_material_exa_cod::varchar AS specimen_code,
           ind_anulacao_laudo::varchar AS cancellation_flag
    FROM exames
    WHERE $1::timestamptz IS NULL OR dthrexame >= $1::timestamptz";

const BEDS_QUERY: &str = "
    SELECT clientid::varchar AS bed_id,
           NULL::varchar AS unit_code,
           NULL::varchar AS unit_name,
           bedstatus::varchar AS status,
           NULL::varchar AS extra_indicator,
           activebeddate::timestamptz AS activated_at,
           disablebeddate::timestamptz AS deactivated_at
    FROM leitos";

const INSERT_ADMISSION: &str = "
    INSERT INTO internacoes
        (hospitaladmissionnumber, medicalrecord, hospitaladmissiondate, medicaldischarge)
    VALUES ($1::varchar, $2::varchar, $3::timestamptz, $4::timestamptz)
    ON CONFLICT (hospitaladmissionnumber) DO NOTHING";

const INSERT_STAY_WITH_ID: &str = "
    INSERT INTO admissoes
        (id, hospitaladmissionnumber, unitcode, bedcode, unitadmissiondatetime)
    VALUES ($1::bigint, $2::varchar, $3::varchar, $4::varchar, $5::timestamptz)
    ON CONFLICT (hospitaladmissionnumber, unitcode, bedcode, unitadmissiondatetime) DO NOTHING";

const INSERT_STAY: &str = "
    INSERT INTO admissoes
        (hospitaladmissionnumber, unitcode, bedcode, unitadmissiondatetime)
    VALUES ($1::varchar, $2::varchar, $3::varchar, $4::timestamptz)
    ON CONFLICT (hospitaladmissionnumber, unitcode, bedcode, unitadmissiondatetime) DO NOTHING";

const INSERT_EXAM: &str = "
    INSERT INTO exames
        (adm_id, idexame, dthrexame, descricao_usual, valor, tipo_inf_valor,
         result_sigla_exa, result_material_exa_cod, ind_anulacao_laudo)
    VALUES ($1::bigint, $2::varchar, $3::timestamptz, $4::varchar, $5::varchar, $6::varchar,
            $7::varchar, $8::varchar, $9::varchar)
    ON CONFLICT (adm_id, idexame, dthrexame) DO NOTHING";

const INSERT_BED: &str = "
    INSERT INTO leitos (clientid, bedcode, bedstatus, activebeddate, disablebeddate)
    VALUES ($1::varchar, $1::varchar, $2::varchar, $3::timestamptz, $4::timestamptz)
    ON CONFLICT (clientid) DO NOTHING";

const UPDATE_BED_STATUS: &str = "
    UPDATE leitos
    SET bedstatus = $2::varchar,
        activebeddate = COALESCE($3::timestamptz, activebeddate),
        disablebeddate = COALESCE($4::timestamptz, disablebeddate)
    WHERE clientid = $1::varchar";

/// Notification log table and entity column per target
fn log_table(target: NotificationTarget) -> (&'static str, &'static str) {
    match target {
        NotificationTarget::Exam => ("log_envio_exames_hl7", "exame_id"),
        NotificationTarget::Bed => ("log_envio_hl7", "lto_id"),
    }
}

pub fn open_notification_statement(target: NotificationTarget) -> String {
    let (table, entity_column) = log_table(target);
    format!(
        "INSERT INTO {table} ({entity_column}, data_envio, status) \
         VALUES ($1::varchar, NOW(), $2::varchar) RETURNING id::bigint"
    )
}

pub fn close_notification_statement(target: NotificationTarget) -> String {
    let (table, _) = log_table(target);
    format!(
        "UPDATE {table} SET status = $2::varchar, mensagem = $3::text, resposta = $4::text \
         WHERE id = $1::bigint"
    )
}

/// Destination clinical-monitoring database
///
/// Also implements [`crate::adapters::database::RunStore`] over the same pool.
pub struct PostgreSQLDestination {
    pub(super) client: Arc<PostgreSQLClient>,
}

impl PostgreSQLDestination {
    pub fn new(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl DestinationStore for PostgreSQLDestination {
    async fn fetch_admissions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Admission>> {
        self.client
            .fetch(EntityKind::Admission, ADMISSIONS_QUERY, &[&since], admission_from_row)
            .await
    }

    async fn fetch_stays(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Stay>> {
        self.client
            .fetch(EntityKind::Stay, STAYS_QUERY, &[&since], stay_from_row)
            .await
    }

    async fn fetch_exams(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ExamResult>> {
        self.client
            .fetch(EntityKind::Exam, EXAMS_QUERY, &[&since], exam_from_row)
            .await
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        self.client
            .fetch(EntityKind::Bed, BEDS_QUERY, &[], bed_from_row)
            .await
    }

    async fn insert_admission(&self, admission: &Admission) -> Result<bool> {
        let affected = self
            .client
            .execute(
                INSERT_ADMISSION,
                &[
                    &admission.admission_number.as_str(),
                    &admission.patient_record_id,
                    &admission.admission_date,
                    &admission.discharge_date,
                ],
            )
            .await
            .map_err(|e| {
                SyncError::write(EntityKind::Admission, admission.admission_number.as_str(), e)
            })?;
        Ok(affected > 0)
    }

    async fn insert_stay(&self, stay: &Stay) -> Result<bool> {
        let number = stay.admission_number.as_str();
        let result = match stay.id {
            Some(id) => {
                self.client
                    .execute(
                        INSERT_STAY_WITH_ID,
                        &[
                            &id,
                            &number,
                            &stay.unit_code,
                            &stay.bed_code,
                            &stay.unit_admission_at,
                        ],
                    )
                    .await
            }
            None => {
                self.client
                    .execute(
                        INSERT_STAY,
                        &[&number, &stay.unit_code, &stay.bed_code, &stay.unit_admission_at],
                    )
                    .await
            }
        };

        let affected =
            result.map_err(|e| SyncError::write(EntityKind::Stay, stay_label(stay), e))?;
        Ok(affected > 0)
    }

    async fn insert_exam(&self, exam: &ExamResult) -> Result<bool> {
        let affected = self
            .client
            .execute_in_transaction(
                INSERT_EXAM,
                &[
                    &exam.stay_id,
                    &exam.exam_code,
                    &exam.collected_at,
                    &exam.description,
                    &exam.value,
                    &exam.value_type,
                    &exam.result_flag_code,
                    &exam.specimen_code,
                    &exam.cancellation_flag,
                ],
            )
            .await
            .map_err(|e| {
                SyncError::write(
                    EntityKind::Exam,
                    NotificationSubject::Exam(exam).entity_id(),
                    e,
                )
            })?;
        Ok(affected > 0)
    }

    async fn insert_bed(&self, bed: &Bed) -> Result<bool> {
        let affected = self
            .client
            .execute(
                INSERT_BED,
                &[
                    &bed.bed_id.as_str(),
                    &bed.status.as_code(),
                    &bed.activated_at,
                    &bed.deactivated_at,
                ],
            )
            .await
            .map_err(|e| SyncError::write(EntityKind::Bed, bed.bed_id.as_str(), e))?;
        Ok(affected > 0)
    }

    async fn update_bed_status(&self, bed: &Bed, status: BedStatus) -> Result<()> {
        let affected = self
            .client
            .execute(
                UPDATE_BED_STATUS,
                &[
                    &bed.bed_id.as_str(),
                    &status.as_code(),
                    &bed.activated_at,
                    &bed.deactivated_at,
                ],
            )
            .await
            .map_err(|e| SyncError::write(EntityKind::Bed, bed.bed_id.as_str(), e))?;

        if affected == 0 {
            return Err(SyncError::write(
                EntityKind::Bed,
                bed.bed_id.as_str(),
                "bed not found in destination",
            ));
        }
        Ok(())
    }

    async fn open_notification(
        &self,
        target: NotificationTarget,
        entity_id: &str,
    ) -> Result<i64> {
        let row = self
            .client
            .query_one(
                &open_notification_statement(target),
                &[&entity_id, &notification_status_code(NotificationStatus::Pending)],
            )
            .await
            .map_err(|e| SyncError::Audit(format!("Failed to open notification log: {e}")))?;

        row.try_get::<_, i64>(0)
            .map_err(|e| SyncError::Audit(format!("Notification log id unreadable: {e}")))
    }

    async fn close_notification(
        &self,
        target: NotificationTarget,
        id: i64,
        status: NotificationStatus,
        message: &str,
        response: Option<&str>,
    ) -> Result<()> {
        self.client
            .execute(
                &close_notification_statement(target),
                &[&id, &notification_status_code(status), &message, &response],
            )
            .await
            .map_err(|e| SyncError::Audit(format!("Failed to close notification log {id}: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_statements_per_target() {
        let exam = open_notification_statement(NotificationTarget::Exam);
        assert!(exam.starts_with("INSERT INTO log_envio_exames_hl7 (exame_id,"));
        assert!(exam.ends_with("RETURNING id::bigint"));

        let bed = close_notification_statement(NotificationTarget::Bed);
        assert!(bed.starts_with("UPDATE log_envio_hl7 SET status"));
    }

    #[test]
    fn test_inserts_are_idempotent() {
        for statement in [
            INSERT_ADMISSION,
            INSERT_STAY,
            INSERT_STAY_WITH_ID,
            INSERT_EXAM,
            INSERT_BED,
        ] {
            assert!(statement.trim_end().ends_with("DO NOTHING"));
        }
    }
}
