//! In-memory implementations of the database and notifier seams

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use ward_sync::adapters::database::{DestinationStore, RunStore, SourceReader};
use ward_sync::core::notify::{Delivery, NotificationSubject, Notifier};
use ward_sync::core::reconcile::Keyed;
use ward_sync::core::state::{AuditEntry, RunCounts, RunRecord, RunStateManager, RunStatus};
use ward_sync::core::sync::{
    BedCoordinator, ReconcileCoordinator, ReconcileOptions, RecordWriter,
};
use ward_sync::domain::{
    AckResult, Admission, AdmissionNumber, Bed, BedId, BedStatus, BedType, EntityKind,
    ExamResult, NotificationStatus, NotificationTarget, Result, Stay, SyncError,
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
}

pub fn bootstrap_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

pub fn admission(number: &str) -> Admission {
    Admission {
        admission_number: AdmissionNumber::new(number).unwrap(),
        patient_record_id: format!("P-{number}"),
        admission_date: t0(),
        discharge_date: None,
    }
}

pub fn stay(id: i64, number: &str, unit: &str, bed: &str, at: DateTime<Utc>) -> Stay {
    Stay {
        id: Some(id),
        admission_number: AdmissionNumber::new(number).unwrap(),
        unit_code: unit.to_string(),
        bed_code: bed.to_string(),
        unit_admission_at: at,
    }
}

pub fn exam(stay_id: i64, code: &str, collected_at: DateTime<Utc>, value: &str) -> ExamResult {
    ExamResult {
        stay_id,
        admission_number: None,
        patient_record_id: None,
        exam_code: code.to_string(),
        collected_at,
        description: Some(format!("{code} result")),
        value: Some(value.to_string()),
        value_type: Some("NM".to_string()),
        result_flag_code: None,
        specimen_code: None,
        cancellation_flag: Some("N".to_string()),
    }
}

pub fn bed(id: &str, status: BedStatus) -> Bed {
    Bed {
        bed_id: BedId::new(id).unwrap(),
        unit_code: Some("12".to_string()),
        unit_name: Some("UTI ADULTO".to_string()),
        status,
        bed_type: Some(BedType::Standard),
        activated_at: Some(t0() - Duration::days(30)),
        deactivated_at: None,
    }
}

/// Source system snapshot
#[derive(Default)]
pub struct MemorySource {
    pub admissions: Vec<Admission>,
    pub stays: Vec<Stay>,
    pub exams: Vec<ExamResult>,
    pub beds: Vec<Bed>,
    /// Entity whose fetch fails
    pub fail_on: Option<EntityKind>,
}

impl MemorySource {
    fn check(&self, entity: EntityKind) -> Result<()> {
        if self.fail_on == Some(entity) {
            return Err(SyncError::read(entity, "relation does not exist"));
        }
        Ok(())
    }
}

fn after<T>(records: &[T], since: Option<DateTime<Utc>>, at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T>
where
    T: Clone,
{
    records
        .iter()
        .filter(|r| since.map_or(true, |s| at(r) >= s))
        .cloned()
        .collect()
}

#[async_trait]
impl SourceReader for MemorySource {
    async fn fetch_admissions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Admission>> {
        self.check(EntityKind::Admission)?;
        Ok(after(&self.admissions, since, |a| a.admission_date))
    }

    async fn fetch_stays(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Stay>> {
        self.check(EntityKind::Stay)?;
        Ok(after(&self.stays, since, |s| s.unit_admission_at))
    }

    async fn fetch_exams(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ExamResult>> {
        self.check(EntityKind::Exam)?;
        Ok(after(&self.exams, since, |e| e.collected_at))
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        self.check(EntityKind::Bed)?;
        Ok(self.beds.clone())
    }
}

#[derive(Debug, Clone)]
pub struct LoggedNotification {
    pub id: i64,
    pub target: NotificationTarget,
    pub entity_id: String,
    pub status: NotificationStatus,
    pub message: Option<String>,
    pub response: Option<String>,
}

#[derive(Default)]
pub struct DestinationState {
    pub admissions: Vec<Admission>,
    pub stays: Vec<Stay>,
    pub exams: Vec<ExamResult>,
    pub beds: Vec<Bed>,
    pub notifications: Vec<LoggedNotification>,
    pub runs: Vec<RunRecord>,
    pub audits: Vec<AuditEntry>,
}

/// Destination system plus its run tables
#[derive(Default)]
pub struct MemoryDestination {
    pub state: Mutex<DestinationState>,
    /// Exam codes whose insert fails
    pub failing_exam_codes: HashSet<String>,
    pub fail_open_notification: bool,
    pub fail_end_run: bool,
}

impl MemoryDestination {
    pub fn with_beds(beds: Vec<Bed>) -> Self {
        let dest = Self::default();
        dest.state.lock().unwrap().beds = beds;
        dest
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().unwrap();
        (state.admissions.len(), state.stays.len(), state.exams.len())
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.state.lock().unwrap().runs.clone()
    }

    pub fn audits(&self) -> Vec<AuditEntry> {
        self.state.lock().unwrap().audits.clone()
    }

    pub fn notifications(&self) -> Vec<LoggedNotification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn bed_status(&self, id: &str) -> Option<BedStatus> {
        self.state
            .lock()
            .unwrap()
            .beds
            .iter()
            .find(|b| b.bed_id.as_str() == id)
            .map(|b| b.status)
    }
}

fn insert_unique<T: Keyed + Clone>(rows: &mut Vec<T>, record: &T) -> bool {
    let key = record.key();
    if rows.iter().any(|r| r.key() == key) {
        return false;
    }
    rows.push(record.clone());
    true
}

#[async_trait]
impl DestinationStore for MemoryDestination {
    async fn fetch_admissions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Admission>> {
        let state = self.state.lock().unwrap();
        Ok(after(&state.admissions, since, |a| a.admission_date))
    }

    async fn fetch_stays(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Stay>> {
        let state = self.state.lock().unwrap();
        Ok(after(&state.stays, since, |s| s.unit_admission_at))
    }

    async fn fetch_exams(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ExamResult>> {
        let state = self.state.lock().unwrap();
        Ok(after(&state.exams, since, |e| e.collected_at))
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        Ok(self.state.lock().unwrap().beds.clone())
    }

    async fn insert_admission(&self, admission: &Admission) -> Result<bool> {
        Ok(insert_unique(&mut self.state.lock().unwrap().admissions, admission))
    }

    async fn insert_stay(&self, stay: &Stay) -> Result<bool> {
        Ok(insert_unique(&mut self.state.lock().unwrap().stays, stay))
    }

    async fn insert_exam(&self, exam: &ExamResult) -> Result<bool> {
        if self.failing_exam_codes.contains(&exam.exam_code) {
            return Err(SyncError::write(
                EntityKind::Exam,
                exam.exam_code.clone(),
                "deadlock detected",
            ));
        }
        Ok(insert_unique(&mut self.state.lock().unwrap().exams, exam))
    }

    async fn insert_bed(&self, bed: &Bed) -> Result<bool> {
        Ok(insert_unique(&mut self.state.lock().unwrap().beds, bed))
    }

    async fn update_bed_status(&self, bed: &Bed, status: BedStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.beds.iter_mut().find(|b| b.bed_id == bed.bed_id) {
            Some(existing) => {
                existing.status = status;
                Ok(())
            }
            None => Err(SyncError::write(
                EntityKind::Bed,
                bed.bed_id.as_str(),
                "bed not found in destination",
            )),
        }
    }

    async fn open_notification(
        &self,
        target: NotificationTarget,
        entity_id: &str,
    ) -> Result<i64> {
        if self.fail_open_notification {
            return Err(SyncError::Audit("log table locked".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.notifications.len() as i64 + 1;
        state.notifications.push(LoggedNotification {
            id,
            target,
            entity_id: entity_id.to_string(),
            status: NotificationStatus::Pending,
            message: None,
            response: None,
        });
        Ok(id)
    }

    async fn close_notification(
        &self,
        _target: NotificationTarget,
        id: i64,
        status: NotificationStatus,
        message: &str,
        response: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| SyncError::Audit(format!("no log row {id}")))?;
        row.status = status;
        row.message = Some(message.to_string());
        row.response = response.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl RunStore for MemoryDestination {
    async fn last_successful_run_start(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .runs
            .iter()
            .filter(|r| r.status == RunStatus::Success)
            .map(|r| r.started_at)
            .max())
    }

    async fn begin_run(&self, started_at: DateTime<Utc>) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let id = state.runs.len() as i64 + 1;
        state.runs.push(RunRecord {
            id,
            started_at,
            finished_at: None,
            status: RunStatus::Running,
            counts: RunCounts::default(),
            error_message: None,
        });
        Ok(id)
    }

    async fn end_run(
        &self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
        error_message: Option<&str>,
    ) -> Result<()> {
        if self.fail_end_run {
            return Err(SyncError::Audit("connection reset".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.id == run_id)
            .ok_or_else(|| SyncError::Audit(format!("no run {run_id}")))?;
        run.finished_at = Some(Utc::now());
        run.status = status;
        run.counts = *counts;
        run.error_message = error_message.map(str::to_string);
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.state.lock().unwrap().audits.push(entry.clone());
        Ok(())
    }

    async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut runs = self.state.lock().unwrap().runs.clone();
        runs.reverse();
        runs.truncate(limit);
        Ok(runs)
    }
}

type AckRule = Box<dyn Fn(&NotificationSubject<'_>) -> AckResult + Send + Sync>;

/// Notifier answering from a rule and recording every call
pub struct ScriptedNotifier {
    rule: AckRule,
    pub calls: Mutex<Vec<(i64, String)>>,
}

impl ScriptedNotifier {
    pub fn new(rule: impl Fn(&NotificationSubject<'_>) -> AckResult + Send + Sync + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::new(|_| AckResult::Accepted)
    }

    pub fn rejecting() -> Self {
        Self::new(|_| AckResult::Rejected("unknown patient".to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn notify(&self, correlation_id: i64, subject: NotificationSubject<'_>) -> Delivery {
        self.calls
            .lock()
            .unwrap()
            .push((correlation_id, subject.entity_id()));
        let ack = (self.rule)(&subject);
        let response = match &ack {
            AckResult::TransportError(_) => None,
            other => Some(format!("MSH|^~\\&|EPIMED\rMSA|{}|{correlation_id}", other.code())),
        };
        Delivery {
            message: format!("MSH|^~\\&|HUAP||EPIMED||||ORU^R01|{correlation_id}|P|2.5"),
            response,
            ack,
        }
    }
}

pub fn reconcile_coordinator(
    source: Arc<MemorySource>,
    destination: Arc<MemoryDestination>,
    notifier: Arc<ScriptedNotifier>,
    options: ReconcileOptions,
) -> ReconcileCoordinator {
    let state = RunStateManager::new(destination.clone(), bootstrap_epoch(), 200);
    let writer = RecordWriter::new(destination.clone(), notifier);
    ReconcileCoordinator::new(source, destination, state, writer, options)
}

pub fn bed_coordinator(
    source: Arc<MemorySource>,
    destination: Arc<MemoryDestination>,
    notifier: Arc<ScriptedNotifier>,
    dry_run: bool,
) -> BedCoordinator {
    let writer = RecordWriter::new(destination.clone(), notifier);
    BedCoordinator::new(source, destination, writer, dry_run)
}
