//! Row mapping between PostgreSQL result sets and domain records
//!
//! Source and destination queries alias their columns to the same names, so
//! one mapper per entity serves both systems. Stored status codes are
//! translated here and nowhere else.

use crate::core::state::run::{RunCounts, RunRecord, RunStatus};
use crate::domain::ids::{AdmissionNumber, BedId};
use crate::domain::notification::NotificationStatus;
use crate::domain::records::{Admission, Bed, BedStatus, BedType, ExamResult, Stay};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

/// Mapping failure for a single row
pub type RowResult<T> = std::result::Result<T, String>;

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> RowResult<T> {
    row.try_get(name)
        .map_err(|e| format!("column '{name}': {e}"))
}

/// Stored code for a run status in `controle_processamento.status`
pub fn run_status_code(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "EM_EXECUCAO",
        RunStatus::Success => "SUCESSO",
        RunStatus::Error => "ERRO",
    }
}

/// Unknown codes are read as errors so they never count as successful
pub fn run_status_from_code(code: &str) -> RunStatus {
    match code.trim() {
        "EM_EXECUCAO" => RunStatus::Running,
        "SUCESSO" => RunStatus::Success,
        _ => RunStatus::Error,
    }
}

pub fn notification_status_code(status: NotificationStatus) -> &'static str {
    match status {
        NotificationStatus::Pending => "pendente",
        NotificationStatus::Sent => "enviado",
        NotificationStatus::Error => "erro",
    }
}

pub fn admission_from_row(row: &Row) -> RowResult<Admission> {
    let number: String = column(row, "admission_number")?;
    Ok(Admission {
        admission_number: AdmissionNumber::new(number)?,
        patient_record_id: column::<Option<String>>(row, "patient_record_id")?
            .unwrap_or_default()
            .trim()
            .to_string(),
        admission_date: column(row, "admission_date")?,
        discharge_date: column(row, "discharge_date")?,
    })
}

pub fn stay_from_row(row: &Row) -> RowResult<Stay> {
    let number: String = column(row, "admission_number")?;
    Ok(Stay {
        id: column(row, "id")?,
        admission_number: AdmissionNumber::new(number)?,
        unit_code: column::<String>(row, "unit_code")?.trim().to_string(),
        bed_code: column::<String>(row, "bed_code")?.trim().to_string(),
        unit_admission_at: column(row, "unit_admission_at")?,
    })
}

/// Exam rows; `admission_number` and `patient_record_id` may be NULL
pub fn exam_from_row(row: &Row) -> RowResult<ExamResult> {
    let admission_number = column::<Option<String>>(row, "admission_number")?
        .map(AdmissionNumber::new)
        .transpose()?;

    Ok(ExamResult {
        stay_id: column(row, "stay_id")?,
        admission_number,
        patient_record_id: column(row, "patient_record_id")?,
        exam_code: column::<String>(row, "exam_code")?.trim().to_string(),
        collected_at: column(row, "collected_at")?,
        description: column(row, "description")?,
        value: column(row, "value")?,
        value_type: column(row, "value_type")?,
        result_flag_code: column(row, "result_flag_code")?,
        specimen_code: column(row, "specimen_code")?,
        cancellation_flag: column(row, "cancellation_flag")?,
    })
}

pub fn bed_from_row(row: &Row) -> RowResult<Bed> {
    let bed_id: String = column(row, "bed_id")?;
    let status: String = column(row, "status")?;
    let bed_type = column::<Option<String>>(row, "extra_indicator")?
        .map(|indicator| BedType::from_extra_indicator(&indicator))
        .transpose()?;

    Ok(Bed {
        bed_id: BedId::new(bed_id)?,
        unit_code: column(row, "unit_code")?,
        unit_name: column(row, "unit_name")?,
        status: BedStatus::from_str(&status)?,
        bed_type,
        activated_at: column(row, "activated_at")?,
        deactivated_at: column(row, "deactivated_at")?,
    })
}

/// Row of `controle_processamento`
#[derive(Debug, Clone)]
pub struct PostgreSQLRunRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: String,
    pub new_admissions: Option<i32>,
    pub new_stays: Option<i32>,
    pub new_exams: Option<i32>,
    pub message: Option<String>,
}

impl PostgreSQLRunRecord {
    pub fn from_row(row: &Row) -> RowResult<Self> {
        Ok(Self {
            id: column(row, "id")?,
            started_at: column(row, "started_at")?,
            finished_at: column(row, "finished_at")?,
            status: column(row, "status")?,
            new_admissions: column(row, "new_admissions")?,
            new_stays: column(row, "new_stays")?,
            new_exams: column(row, "new_exams")?,
            message: column(row, "message")?,
        })
    }

    pub fn to_domain(&self) -> RunRecord {
        let count = |value: Option<i32>| value.map(|v| v.max(0) as usize).unwrap_or(0);
        RunRecord {
            id: self.id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            status: run_status_from_code(&self.status),
            counts: RunCounts {
                admissions: count(self.new_admissions),
                stays: count(self.new_stays),
                exams: count(self.new_exams),
            },
            error_message: self.message.clone(),
        }
    }
}

/// Counts are stored as INTEGER columns
pub fn count_param(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
