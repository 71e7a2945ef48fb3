//! Watermark and audit tables on the destination database
//!
//! `controle_processamento` holds one row per run and drives the watermark;
//! `log_execucoes` receives the independent audit summary.

use super::destination::PostgreSQLDestination;
use super::models::{count_param, run_status_code, PostgreSQLRunRecord};
use crate::adapters::database::traits::RunStore;
use crate::core::state::run::{AuditEntry, RunCounts, RunRecord, RunStatus};
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const LAST_SUCCESS_QUERY: &str = "
    SELECT MAX(data_inicio)::timestamptz
    FROM controle_processamento
    WHERE status = $1::varchar";

const BEGIN_RUN: &str = "
    INSERT INTO controle_processamento (data_inicio, status)
    VALUES ($1::timestamptz, $2::varchar)
    RETURNING id::bigint";

const END_RUN: &str = "
    UPDATE controle_processamento
    SET data_fim = NOW(),
        status = $2::varchar,
        novas_internacoes = $3::int4,
        novas_admissoes = $4::int4,
        novos_exames = $5::int4,
        mensagem = $6::text
    WHERE id = $1::bigint";

const APPEND_AUDIT: &str = "
    INSERT INTO log_execucoes
        (data_execucao, novas_internacoes, novas_admissoes, novos_exames, duracao, status, mensagem)
    VALUES ($1::timestamptz, $2::int4, $3::int4, $4::int4,
            $5::float8 * INTERVAL '1 second', $6::varchar, $7::text)";

const RECENT_RUNS: &str = "
    SELECT id::bigint AS id,
           data_inicio::timestamptz AS started_at,
           data_fim::timestamptz AS finished_at,
           status::varchar AS status,
           novas_internacoes::int4 AS new_admissions,
           novas_admissoes::int4 AS new_stays,
           novos_exames::int4 AS new_exams,
           mensagem::varchar AS message
    FROM controle_processamento
    ORDER BY data_inicio DESC, id DESC
    LIMIT $1::bigint";

#[async_trait]
impl RunStore for PostgreSQLDestination {
    async fn last_successful_run_start(&self) -> Result<Option<DateTime<Utc>>> {
        let row = self
            .client
            .query_one(LAST_SUCCESS_QUERY, &[&run_status_code(RunStatus::Success)])
            .await
            .map_err(|e| SyncError::State(format!("Failed to read watermark: {e}")))?;

        row.try_get::<_, Option<DateTime<Utc>>>(0)
            .map_err(|e| SyncError::State(format!("Watermark unreadable: {e}")))
    }

    async fn begin_run(&self, started_at: DateTime<Utc>) -> Result<i64> {
        let row = self
            .client
            .query_one(BEGIN_RUN, &[&started_at, &run_status_code(RunStatus::Running)])
            .await
            .map_err(|e| SyncError::State(format!("Failed to open run record: {e}")))?;

        row.try_get::<_, i64>(0)
            .map_err(|e| SyncError::State(format!("Run record id unreadable: {e}")))
    }

    async fn end_run(
        &self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
        error_message: Option<&str>,
    ) -> Result<()> {
        self.client
            .execute(
                END_RUN,
                &[
                    &run_id,
                    &run_status_code(status),
                    &count_param(counts.admissions),
                    &count_param(counts.stays),
                    &count_param(counts.exams),
                    &error_message,
                ],
            )
            .await
            .map_err(|e| SyncError::Audit(format!("Failed to close run record {run_id}: {e}")))?;
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.client
            .execute(
                APPEND_AUDIT,
                &[
                    &entry.executed_at,
                    &count_param(entry.counts.admissions),
                    &count_param(entry.counts.stays),
                    &count_param(entry.counts.exams),
                    &entry.duration.as_secs_f64(),
                    &run_status_code(entry.status),
                    &entry.message,
                ],
            )
            .await
            .map_err(|e| SyncError::Audit(format!("Failed to append audit row: {e}")))?;
        Ok(())
    }

    async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .client
            .query(RECENT_RUNS, &[&limit])
            .await
            .map_err(|e| SyncError::State(format!("Failed to read run history: {e}")))?;

        rows.iter()
            .map(|row| {
                PostgreSQLRunRecord::from_row(row)
                    .map(|record| record.to_domain())
                    .map_err(|e| SyncError::State(format!("Run record unreadable: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_only_counts_successful_runs() {
        assert!(LAST_SUCCESS_QUERY.contains("MAX(data_inicio)"));
        assert!(LAST_SUCCESS_QUERY.contains("WHERE status = $1"));
        assert_eq!(run_status_code(RunStatus::Success), "SUCESSO");
    }

    #[test]
    fn test_begin_run_opens_running_row() {
        assert!(BEGIN_RUN.contains("RETURNING id"));
        assert_eq!(run_status_code(RunStatus::Running), "EM_EXECUCAO");
    }
}
