//! HL7 v2 ORU^R01 rendering for exam results and bed status changes
//!
//! Segments are assembled by field position so empty fields between
//! populated ones are emitted as consecutive separators. Values are escaped
//! with the standard HL7 escape sequences.

use crate::config::Hl7Config;
use crate::domain::errors::SyncError;
use crate::domain::records::{Bed, ExamResult};
use crate::domain::result::Result;
use chrono::{DateTime, FixedOffset, Utc};

const FIELD_SEPARATOR: char = '|';
const COMPONENT_SEPARATOR: char = '^';
const ENCODING_CHARACTERS: &str = "^~\\&";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Escapes HL7 delimiter characters inside a single value
///
/// Line breaks are replaced by spaces because they would end the segment.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\E\\"),
            '|' => escaped.push_str("\\F\\"),
            '^' => escaped.push_str("\\S\\"),
            '&' => escaped.push_str("\\T\\"),
            '~' => escaped.push_str("\\R\\"),
            '\r' | '\n' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}

/// One segment under construction
#[derive(Debug, Clone)]
pub struct Segment {
    name: &'static str,
    fields: Vec<String>,
}

impl Segment {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    fn slot(&mut self, position: usize) -> &mut String {
        if self.fields.len() <= position {
            self.fields.resize(position + 1, String::new());
        }
        &mut self.fields[position]
    }

    /// Sets an escaped field value at `position`
    pub fn field(mut self, position: usize, value: &str) -> Self {
        *self.slot(position) = escape(value);
        self
    }

    /// Sets an optional field, leaving it empty for `None`
    pub fn opt_field(self, position: usize, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.field(position, value),
            None => self,
        }
    }

    /// Sets a field made of components, each escaped separately
    pub fn components(mut self, position: usize, components: &[&str]) -> Self {
        let joined = components
            .iter()
            .map(|c| escape(c))
            .collect::<Vec<_>>()
            .join(&COMPONENT_SEPARATOR.to_string());
        *self.slot(position) = joined;
        self
    }

    fn raw(mut self, position: usize, value: &str) -> Self {
        *self.slot(position) = value.to_string();
        self
    }

    /// Renders the segment without a terminator
    pub fn render(&self) -> String {
        let mut out = String::from(self.name);
        // MSH-1 is the field separator itself
        let first = if self.name == "MSH" { 2 } else { 1 };
        for position in first..self.fields.len() {
            out.push(FIELD_SEPARATOR);
            out.push_str(&self.fields[position]);
        }
        out
    }
}

/// Renders outbound messages with the configured header values
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    config: Hl7Config,
    offset: FixedOffset,
}

impl MessageRenderer {
    /// # Errors
    ///
    /// Returns a configuration error if `utc_offset_minutes` is out of range
    pub fn new(config: Hl7Config) -> Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            SyncError::Configuration(format!(
                "hl7.utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            ))
        })?;
        Ok(Self { config, offset })
    }

    /// Formats an instant as an HL7 `TS` value in the configured offset
    pub fn timestamp(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    fn header(&self, control_id: i64, now: &DateTime<Utc>) -> Segment {
        Segment::new("MSH")
            .raw(2, ENCODING_CHARACTERS)
            .field(3, &self.config.sending_application)
            .field(4, &self.config.sending_facility)
            .field(5, &self.config.receiving_application)
            .field(6, &self.config.receiving_facility)
            .field(7, &self.timestamp(now))
            .components(9, &["ORU", "R01"])
            .field(10, &control_id.to_string())
            .field(11, &self.config.processing_id)
            .field(12, &self.config.version)
            .field(18, &self.config.charset)
    }

    fn join(&self, segments: &[Segment]) -> String {
        segments
            .iter()
            .map(Segment::render)
            .collect::<Vec<_>>()
            .join(self.config.segment_separator.as_str())
    }

    /// Renders an exam result; `control_id` is the notification log id
    pub fn render_exam(&self, control_id: i64, exam: &ExamResult, now: &DateTime<Utc>) -> String {
        let collected = self.timestamp(&exam.collected_at);
        let description = exam.description.as_deref().unwrap_or("");
        let admission = exam.admission_number.as_ref().map(|a| a.as_str());

        let segments = [
            self.header(control_id, now),
            Segment::new("PID")
                .field(1, "1")
                .opt_field(3, exam.patient_record_id.as_deref()),
            Segment::new("PV1")
                .field(1, "1")
                .field(2, "I")
                .opt_field(19, admission),
            Segment::new("OBR")
                .field(1, "1")
                .field(2, &control_id.to_string())
                .components(4, &[&exam.exam_code, description])
                .field(7, &collected),
            Segment::new("OBX")
                .field(1, "1")
                .opt_field(2, exam.value_type.as_deref())
                .components(3, &[&exam.exam_code, description])
                .opt_field(5, exam.value.as_deref())
                .opt_field(8, exam.result_flag_code.as_deref())
                .field(11, "F")
                .field(14, &collected)
                .opt_field(15, exam.specimen_code.as_deref()),
        ];
        self.join(&segments)
    }

    /// Renders a bed announcement; `control_id` is the notification log id
    pub fn render_bed(&self, control_id: i64, bed: &Bed, now: &DateTime<Utc>) -> String {
        let unit_code = bed.unit_code.as_deref().unwrap_or("");
        let unit_name = bed.unit_name.as_deref().unwrap_or("");
        let type_code = bed.bed_type.map(|t| t.message_code()).unwrap_or("");
        let updated = self.timestamp(&bed.status_since().unwrap_or(*now));
        // OBX-12 only for active beds, OBX-14 only for inactive ones
        let since = bed.status_since().map(|ts| self.timestamp(&ts));
        let (activated, deactivated) = if bed.status.is_active() {
            (since, None)
        } else {
            (None, since)
        };

        let segments = [
            self.header(control_id, now),
            Segment::new("PV1")
                .field(1, "1")
                .components(3, &[unit_code, "", unit_name]),
            Segment::new("PID").field(1, "1"),
            Segment::new("OBR")
                .field(1, "1")
                .field(2, &control_id.to_string())
                .field(7, &updated),
            Segment::new("OBX")
                .field(1, "1")
                .field(2, "ST")
                .components(3, &[bed.bed_id.as_str(), bed.bed_id.as_str()])
                .components(5, &[type_code, bed.status.message_code()])
                .opt_field(12, activated.as_deref())
                .opt_field(14, deactivated.as_deref()),
        ];
        self.join(&segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentSeparator;
    use crate::domain::ids::{AdmissionNumber, BedId};
    use crate::domain::records::{BedStatus, BedType};
    use chrono::TimeZone;

    fn renderer() -> MessageRenderer {
        MessageRenderer::new(Hl7Config::default()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn exam() -> ExamResult {
        ExamResult {
            stay_id: 10,
            admission_number: Some(AdmissionNumber::new("A100").unwrap()),
            patient_record_id: Some("P555".to_string()),
            exam_code: "HGB".to_string(),
            collected_at: Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap(),
            description: Some("Hemoglobina".to_string()),
            value: Some("13.2".to_string()),
            value_type: Some("NM".to_string()),
            result_flag_code: Some("N".to_string()),
            specimen_code: Some("SANGUE".to_string()),
            cancellation_flag: None,
        }
    }

    fn bed(status: BedStatus) -> Bed {
        Bed {
            bed_id: BedId::new("0101A").unwrap(),
            unit_code: Some("12".to_string()),
            unit_name: Some("UTI ADULTO".to_string()),
            status,
            bed_type: Some(BedType::Extra),
            activated_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap()),
            deactivated_at: None,
        }
    }

    #[test]
    fn test_escape_delimiters() {
        assert_eq!(escape("a|b^c&d~e\\f"), "a\\F\\b\\S\\c\\T\\d\\R\\e\\E\\f");
        assert_eq!(escape("line1\rline2"), "line1 line2");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_segment_positions() {
        let segment = Segment::new("OBX").field(1, "1").field(5, "x");
        assert_eq!(segment.render(), "OBX|1||||x");
        assert_eq!(Segment::new("PID").render(), "PID");
    }

    #[test]
    fn test_header_layout() {
        let message = renderer().render_bed(42, &bed(BedStatus::Active), &now());
        let msh = message.split('\r').next().unwrap();
        assert_eq!(
            msh,
            "MSH|^~\\&|HUAP||EPIMED||20250110120000||ORU^R01|42|P|2.5||||||ASCII"
        );
    }

    #[test]
    fn test_render_bed_segments() {
        let message = renderer().render_bed(42, &bed(BedStatus::Active), &now());
        let segments: Vec<&str> = message.split('\r').collect();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[1], "PV1|1||12^^UTI ADULTO");
        assert_eq!(segments[2], "PID|1");
        assert_eq!(segments[3], "OBR|1|42|||||20240301070000");
        assert_eq!(
            segments[4],
            "OBX|1|ST|0101A^0101A||2^1|||||||20240301070000"
        );
    }

    #[test]
    fn test_render_inactive_bed_carries_only_deactivation() {
        let mut inactive = bed(BedStatus::Inactive);
        inactive.deactivated_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
        let message = renderer().render_bed(7, &inactive, &now());
        let obx = message.split('\r').last().unwrap();
        assert_eq!(obx, "OBX|1|ST|0101A^0101A||2^0|||||||||20240601070000");
    }

    #[test]
    fn test_render_reactivated_bed_carries_only_activation() {
        let mut active = bed(BedStatus::Active);
        active.activated_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
        active.deactivated_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap());
        let message = renderer().render_bed(7, &active, &now());
        let segments: Vec<&str> = message.split('\r').collect();
        assert_eq!(segments[3], "OBR|1|7|||||20240601070000");
        assert_eq!(segments[4], "OBX|1|ST|0101A^0101A||2^1|||||||20240601070000");
    }

    #[test]
    fn test_render_exam_segments() {
        let message = renderer().render_exam(9, &exam(), &now());
        let segments: Vec<&str> = message.split('\r').collect();
        assert_eq!(segments[1], "PID|1||P555");
        assert!(segments[2].starts_with("PV1|1|I|"));
        assert!(segments[2].ends_with("|A100"));
        assert_eq!(segments[3], "OBR|1|9||HGB^Hemoglobina|||20250110093000");
        assert_eq!(
            segments[4],
            "OBX|1|NM|HGB^Hemoglobina||13.2|||N|||F|||20250110093000|SANGUE"
        );
    }

    #[test]
    fn test_timestamp_offset_and_separator() {
        let config = Hl7Config {
            utc_offset_minutes: -180,
            segment_separator: SegmentSeparator::Lf,
            ..Hl7Config::default()
        };
        let renderer = MessageRenderer::new(config).unwrap();
        assert_eq!(renderer.timestamp(&now()), "20250110090000");
        let message = renderer.render_exam(1, &exam(), &now());
        assert_eq!(message.lines().count(), 5);
        assert!(!message.contains('\r'));
    }
}
