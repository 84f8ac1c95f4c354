use chrono::NaiveDateTime;
use std::num::ParseFloatError;

/// Textual timestamp form used by the MOENV API and by exported CSV files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Re-saved extracts (e.g. by spreadsheet tools) sometimes carry seconds.
const TIMESTAMP_FORMAT_SECONDS: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_SECONDS))
        .ok()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a numeric cell. Empty cells and `NaN` are missing values.
pub fn parse_numeric(raw: &str) -> Result<Option<f64>, ParseFloatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw.parse()?;
    Ok(if value.is_nan() { None } else { Some(value) })
}

/// Trims a text cell, mapping blanks to `None`.
pub fn non_empty(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}
