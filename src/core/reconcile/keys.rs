//! Natural keys for each reconciled entity kind
//!
//! Keys only contain business fields. Timestamps inside keys are converted to
//! UTC and truncated to whole seconds so that the two database systems agree
//! on the same instant regardless of offset or sub-second precision.

use crate::domain::ids::{AdmissionNumber, BedId};
use crate::domain::records::{Admission, Bed, ExamResult, Stay};
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use std::hash::Hash;

/// A record that can be matched across systems by a natural key
pub trait Keyed {
    type Key: Eq + Hash;

    fn key(&self) -> Self::Key;
}

/// Converts an instant to UTC with whole-second precision
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use ward_sync::core::reconcile::normalize_instant;
///
/// let local = FixedOffset::west_opt(3 * 3600)
///     .unwrap()
///     .with_ymd_and_hms(2025, 1, 10, 5, 0, 0)
///     .unwrap();
/// let utc = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
/// assert_eq!(normalize_instant(&local), normalize_instant(&utc));
/// ```
pub fn normalize_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Utc> {
    instant.with_timezone(&Utc).trunc_subsecs(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StayKey {
    pub admission_number: AdmissionNumber,
    pub unit_code: String,
    pub bed_code: String,
    pub unit_admission_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExamKey {
    pub stay_id: i64,
    pub exam_code: String,
    pub collected_at: DateTime<Utc>,
}

impl Keyed for Admission {
    type Key = AdmissionNumber;

    fn key(&self) -> Self::Key {
        self.admission_number.clone()
    }
}

impl Keyed for Stay {
    type Key = StayKey;

    fn key(&self) -> Self::Key {
        StayKey {
            admission_number: self.admission_number.clone(),
            unit_code: self.unit_code.trim().to_string(),
            bed_code: self.bed_code.trim().to_string(),
            unit_admission_at: normalize_instant(&self.unit_admission_at),
        }
    }
}

impl Keyed for ExamResult {
    type Key = ExamKey;

    fn key(&self) -> Self::Key {
        ExamKey {
            stay_id: self.stay_id,
            exam_code: self.exam_code.trim().to_string(),
            collected_at: normalize_instant(&self.collected_at),
        }
    }
}

impl Keyed for Bed {
    type Key = BedId;

    fn key(&self) -> Self::Key {
        self.bed_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn stay(at: DateTime<Utc>) -> Stay {
        Stay {
            id: None,
            admission_number: AdmissionNumber::new("A100").unwrap(),
            unit_code: "ICU".to_string(),
            bed_code: "BED7".to_string(),
            unit_admission_at: at,
        }
    }

    #[test]
    fn test_normalize_drops_subseconds() {
        let base = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let with_micros = base + Duration::microseconds(123_456);
        assert_eq!(normalize_instant(&with_micros), base);
    }

    #[test]
    fn test_normalize_converts_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        assert_eq!(
            normalize_instant(&local),
            Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_stay_key_ignores_row_id_and_padding() {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let mut a = stay(at);
        let mut b = stay(at + Duration::milliseconds(999));
        a.id = Some(1);
        b.id = Some(77);
        b.bed_code = "BED7  ".to_string();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_stay_key_distinguishes_seconds() {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        assert_ne!(stay(at).key(), stay(at + Duration::seconds(1)).key());
    }
}
