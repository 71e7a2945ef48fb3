//! Read-only queries against the source hospital database

use super::client::PostgreSQLClient;
use super::models::{admission_from_row, bed_from_row, exam_from_row, stay_from_row};
use crate::adapters::database::traits::SourceReader;
use crate::config::ReconcileConfig;
use crate::domain::records::{Admission, Bed, ExamResult, Stay};
use crate::domain::{EntityKind, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const ADMISSIONS_QUERY: &str = "
    SELECT hospitaladmissionnumber::varchar AS admission_number,
           medicalrecord::varchar AS patient_record_id,
           hospitaladmissiondate::timestamptz AS admission_date,
           medicaldischarge::timestamptz AS discharge_date
    FROM internacoes
    WHERE $1::timestamptz IS NULL OR hospitaladmissiondate >= $1::timestamptz
    ORDER BY hospitaladmissiondate, hospitaladmissionnumber";

const STAYS_QUERY: &str = "
    SELECT id::bigint AS id,
           hospitaladmissionnumber::varchar AS admission_number,
           unitcode::varchar AS unit_code,
           bedcode::varchar AS bed_code,
           unitadmissiondatetime::timestamptz AS unit_admission_at
    FROM admissoes
    WHERE $1::timestamptz IS NULL OR unitadmissiondatetime >= $1::timestamptz
    ORDER BY unitadmissiondatetime, hospitaladmissionnumber";

/// Only the latest stay of each admission is eligible for exams
const MOST_RECENT_STAYS: &str = "
    SELECT DISTINCT ON (a.hospitaladmissionnumber)
           a.id, a.hospitaladmissionnumber, a.unitadmissiondatetime
    FROM admissoes a
    ORDER BY a.hospitaladmissionnumber, a.unitadmissiondatetime DESC";

const ALL_STAYS: &str = "
    SELECT a.id, a.hospitaladmissionnumber, a.unitadmissiondatetime
    FROM admissoes a";

/// `$2`/`$3` are the back and forward window in hours
const EXAMS_QUERY_BODY: &str = "
    SELECT s.id::bigint AS stay_id,
           s.hospitaladmissionnumber::varchar AS admission_number,
           i.medicalrecord::varchar AS patient_record_id,
           ve.campo_laudo_nome::varchar AS exam_code,
           ve.criado_em::timestamptz AS collected_at,
           ve.descricao_usual::varchar AS description,
           ve.are_valor::varchar AS value,
           ve.tipo_inf_valor::varchar AS value_type,
           ve.result_sigla_exa::varchar AS result_flag_code,
           ve.result_material_exa_cod::varchar AS specimen_code,
           ve.ind_anulacao_laudo::varchar AS cancellation_flag
    FROM stays s
    JOIN internacoes i
      ON i.hospitaladmissionnumber = s.hospitaladmissionnumber
    JOIN vw_exames ve
      ON ve.prontuario::varchar = i.medicalrecord::varchar
     AND ve.criado_em BETWEEN s.unitadmissiondatetime - make_interval(hours => $2)
                          AND s.unitadmissiondatetime + make_interval(hours => $3)
    WHERE COALESCE(ve.ind_anulacao_laudo, 'N') <> 'S'
      AND ($1::timestamptz IS NULL OR ve.criado_em >= $1::timestamptz)
    ORDER BY ve.criado_em, s.id, ve.campo_laudo_nome";

/// The journal stores the row image before each change, so the latest
/// entry with old status `I` marks the last activation and the latest with
/// old status `A` the last deactivation
const BEDS_QUERY: &str = r#"
    SELECT l.lto_id::varchar AS bed_id,
           uf.seq::varchar AS unit_code,
           uf.descricao::varchar AS unit_name,
           l.ind_situacao::varchar AS status,
           l.ind_leito_extra::varchar AS extra_indicator,
           COALESCE(act.changed_at, created.created_at)::timestamptz AS activated_at,
           deact.changed_at::timestamptz AS deactivated_at
    FROM "agh"."ain_leitos" l
    JOIN "agh"."agh_unidades_funcionais" uf ON uf.seq = l.unf_seq
    LEFT JOIN LATERAL (
        SELECT MIN(e.dthr_lancamento) AS created_at
        FROM "agh"."ain_extrato_leitos" e
        WHERE e.lto_lto_id = l.lto_id
    ) created ON TRUE
    LEFT JOIN LATERAL (
        SELECT MAX(j.jn_date_time) AS changed_at
        FROM "agh"."ain_leitos_jn" j
        WHERE j.lto_id = l.lto_id AND j.ind_situacao = 'I'
    ) act ON TRUE
    LEFT JOIN LATERAL (
        SELECT MAX(j.jn_date_time) AS changed_at
        FROM "agh"."ain_leitos_jn" j
        WHERE j.lto_id = l.lto_id AND j.ind_situacao = 'A'
    ) deact ON TRUE
    ORDER BY l.lto_id"#;

/// Builds the exam query for the chosen stay selection
pub fn exams_query(most_recent_stay_only: bool) -> String {
    let stays = if most_recent_stay_only {
        MOST_RECENT_STAYS
    } else {
        ALL_STAYS
    };
    format!("WITH stays AS ({stays}){EXAMS_QUERY_BODY}")
}

/// Source-of-record reader
pub struct PostgreSQLSource {
    client: Arc<PostgreSQLClient>,
    exams_query: String,
    window_back_hours: i32,
    window_forward_hours: i32,
}

impl PostgreSQLSource {
    pub fn new(client: Arc<PostgreSQLClient>, reconcile: &ReconcileConfig) -> Self {
        Self {
            client,
            exams_query: exams_query(reconcile.most_recent_stay_only),
            window_back_hours: reconcile.exam_window_back_hours as i32,
            window_forward_hours: reconcile.exam_window_forward_hours as i32,
        }
    }
}

#[async_trait]
impl SourceReader for PostgreSQLSource {
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
            .fetch(
                EntityKind::Exam,
                &self.exams_query,
                &[&since, &self.window_back_hours, &self.window_forward_hours],
                exam_from_row,
            )
            .await
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        self.client
            .fetch(EntityKind::Bed, BEDS_QUERY, &[], bed_from_row)
            .await
    }
}
