//! Picking a download window out of the timestamps the API currently serves.

use crate::api::error::ApiError;
use crate::api::records::{field_text, ApiRecord};
use crate::types::column::BaseColumn;
use crate::utils::parse_timestamp;
use chrono::NaiveDateTime;
use log::warn;

/// Distinct creation timestamps present in an API page, ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailableRange {
    timestamps: Vec<NaiveDateTime>,
}

impl AvailableRange {
    pub fn new(mut timestamps: Vec<NaiveDateTime>) -> Self {
        timestamps.sort();
        timestamps.dedup();
        Self { timestamps }
    }

    /// Collects the `datacreationdate` of every record. Unparseable values are skipped.
    pub fn from_records(records: &[ApiRecord]) -> Self {
        let timestamps = records
            .iter()
            .filter_map(|record| {
                let raw = field_text(record, BaseColumn::CreationDate.as_str());
                let parsed = parse_timestamp(&raw);
                if parsed.is_none() {
                    warn!("Skipping record with unparseable datacreationdate '{}'", raw);
                }
                parsed
            })
            .collect();
        Self::new(timestamps)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Every timestamp except the latest, which leaves no room for an end time.
    pub fn start_candidates(&self) -> &[NaiveDateTime] {
        match self.timestamps.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Timestamps strictly after `start`.
    pub fn end_candidates(&self, start: NaiveDateTime) -> &[NaiveDateTime] {
        let from = self.timestamps.partition_point(|ts| *ts <= start);
        &self.timestamps[from..]
    }
}

/// Checks that `end` comes after `start`.
pub fn validate_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ApiError> {
    if end <= start {
        return Err(ApiError::InvalidRange { start, end });
    }
    Ok(())
}

/// File name for a downloaded window, e.g. `2024-05-28 04_to_2024-05-28 05_aqi_data.csv`.
pub fn export_file_name(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{}_to_{}_aqi_data.csv",
        start.format("%Y-%m-%d %H"),
        end.format("%Y-%m-%d %H")
    )
}
