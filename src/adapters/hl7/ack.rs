//! Acknowledgement parsing
//!
//! The receiver answers with an ACK message, possibly wrapped in an envelope
//! (SOAP, JSON string or plain text). The MSA segment is located anywhere in
//! the body and MSA-1 decides the outcome.

use crate::domain::notification::AckResult;

/// Extracts the acknowledgement from a raw response body
///
/// ```
/// use ward_sync::adapters::hl7::parse_ack;
/// use ward_sync::domain::AckResult;
///
/// let body = "MSH|^~\\&|EPIMED||HUAP||20250110||ACK|1|P|2.5\rMSA|AA|42";
/// assert_eq!(parse_ack(body), AckResult::Accepted);
/// ```
pub fn parse_ack(raw: &str) -> AckResult {
    let Some(fields) = find_msa(raw) else {
        return AckResult::TransportError(format!(
            "No MSA segment in acknowledgement: {}",
            preview(raw)
        ));
    };

    let code = fields.get(1).map(|c| c.trim()).unwrap_or("");
    let detail = fields
        .get(3)
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| fields.get(2).map(|c| c.trim()).unwrap_or(""))
        .to_string();

    match code {
        "AA" => AckResult::Accepted,
        "AE" => AckResult::ApplicationError(detail),
        "AR" => AckResult::Rejected(detail),
        "" => AckResult::TransportError("MSA segment without acknowledgement code".to_string()),
        other => AckResult::TransportError(format!("Unrecognised acknowledgement code '{other}'")),
    }
}

fn find_msa(raw: &str) -> Option<Vec<&str>> {
    raw.split(['\r', '\n'])
        .find_map(|line| line.find("MSA|").map(|start| &line[start..]))
        .map(|segment| {
            // Stop at envelope markup following the segment
            let end = segment.find(['<', '"']).unwrap_or(segment.len());
            segment[..end].split('|').collect()
        })
}

fn preview(raw: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = raw.trim();
    if trimmed.chars().count() <= LIMIT {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}
