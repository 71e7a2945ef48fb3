//! Clinical record types shared by both database systems
//!
//! The same shapes are produced by the source and destination readers so the
//! reconciler can compare them directly. Fields that only one side knows
//! about are optional.

use crate::domain::ids::{AdmissionNumber, BedId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One hospital stay episode for a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub admission_number: AdmissionNumber,
    pub patient_record_id: String,
    pub admission_date: DateTime<Utc>,
    /// `None` while the patient is still admitted
    pub discharge_date: Option<DateTime<Utc>>,
}

/// A placement in a unit/bed during an admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    /// Row id in the system the stay was read from
    pub id: Option<i64>,
    pub admission_number: AdmissionNumber,
    pub unit_code: String,
    pub bed_code: String,
    pub unit_admission_at: DateTime<Utc>,
}

/// A laboratory result attributed to a stay by temporal proximity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    pub stay_id: i64,
    pub admission_number: Option<AdmissionNumber>,
    pub patient_record_id: Option<String>,
    pub exam_code: String,
    pub collected_at: DateTime<Utc>,
    pub description: Option<String>,
    pub value: Option<String>,
    pub value_type: Option<String>,
    pub result_flag_code: Option<String>,
    pub specimen_code: Option<String>,
    pub cancellation_flag: Option<String>,
}

impl ExamResult {
    /// Flag value the source system uses for an annulled report
    pub const CANCELLED_FLAG: &'static str = "S";

    /// Cancelled results are never eligible for reconciliation
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_flag
            .as_deref()
            .map(|flag| flag.trim().eq_ignore_ascii_case(Self::CANCELLED_FLAG))
            .unwrap_or(false)
    }
}

/// Bed lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    Active,
    Inactive,
}

impl BedStatus {
    /// Code stored by both database systems
    pub fn as_code(&self) -> &'static str {
        match self {
            BedStatus::Active => "A",
            BedStatus::Inactive => "I",
        }
    }

    /// Code carried in outbound bed messages
    pub fn message_code(&self) -> &'static str {
        match self {
            BedStatus::Active => "1",
            BedStatus::Inactive => "0",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BedStatus::Active)
    }
}

impl FromStr for BedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(BedStatus::Active),
            "I" => Ok(BedStatus::Inactive),
            other => Err(format!("Unknown bed status code '{other}'")),
        }
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BedStatus::Active => f.write_str("active"),
            BedStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// Standard or extra (overflow) bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedType {
    Standard,
    Extra,
}

impl BedType {
    /// Maps the source "extra bed" indicator (`N`/`S`)
    pub fn from_extra_indicator(indicator: &str) -> Result<Self, String> {
        match indicator.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(BedType::Standard),
            "S" => Ok(BedType::Extra),
            other => Err(format!("Unknown extra-bed indicator '{other}'")),
        }
    }

    pub fn message_code(&self) -> &'static str {
        match self {
            BedType::Standard => "1",
            BedType::Extra => "2",
        }
    }
}

/// A care location with an active/inactive lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub bed_id: BedId,
    pub unit_code: Option<String>,
    pub unit_name: Option<String>,
    pub status: BedStatus,
    pub bed_type: Option<BedType>,
    pub activated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Bed {
    /// Timestamp of the transition into the current status, if known
    pub fn status_since(&self) -> Option<DateTime<Utc>> {
        match self.status {
            BedStatus::Active => self.activated_at,
            BedStatus::Inactive => self.deactivated_at,
        }
    }
}
