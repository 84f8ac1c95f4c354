//! JSON shape of the `aqx_p_488` endpoint and its conversion into typed records.

use crate::api::error::ApiError;
use crate::types::column::{BaseColumn, Pollutant};
use crate::types::record::{AqiRecord, IdentityKey, SiteId};
use crate::types::row_set::RowSet;
use crate::utils::{non_empty, parse_numeric, parse_timestamp};
use serde::Deserialize;
use serde_json::Value;

/// One record as returned by the API. Every field arrives as a JSON string,
/// numbers are accepted as well.
pub type ApiRecord = serde_json::Map<String, Value>;

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub records: Vec<ApiRecord>,
}

/// Text of `field`, empty when absent or null.
pub fn field_text(record: &ApiRecord, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Keeps the base columns plus `pollutants` of every record, in response order.
///
/// # Errors
///
/// [`ApiError::InvalidRecord`] when a site id or timestamp cannot be parsed, or a
/// numeric field holds text.
pub fn to_row_set(records: &[ApiRecord], pollutants: &[Pollutant]) -> Result<RowSet, ApiError> {
    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let invalid = |field: &str, value: String| ApiError::InvalidRecord {
            index,
            field: field.to_string(),
            value,
        };

        let site = field_text(record, BaseColumn::SiteId.as_str());
        let site_id: SiteId = site
            .parse()
            .map_err(|_| invalid(BaseColumn::SiteId.as_str(), site.clone()))?;
        let created = field_text(record, BaseColumn::CreationDate.as_str());
        let created = parse_timestamp(&created)
            .ok_or_else(|| invalid(BaseColumn::CreationDate.as_str(), created.clone()))?;

        let aqi = field_text(record, BaseColumn::Aqi.as_str());
        let aqi = parse_numeric(&aqi).map_err(|_| invalid(BaseColumn::Aqi.as_str(), aqi.clone()))?;

        let mut row = AqiRecord::builder(IdentityKey { site_id, created })
            .maybe_site_name(non_empty(&field_text(record, BaseColumn::SiteName.as_str())))
            .maybe_aqi(aqi)
            .maybe_status(non_empty(&field_text(record, BaseColumn::Status.as_str())))
            .build();

        for pollutant in pollutants {
            let raw = field_text(record, pollutant.as_str());
            if let Some(value) =
                parse_numeric(&raw).map_err(|_| invalid(pollutant.as_str(), raw.clone()))?
            {
                row.pollutants.insert(*pollutant, value);
            }
        }
        rows.push(row);
    }

    Ok(RowSet::with_pollutants(pollutants, rows))
}
