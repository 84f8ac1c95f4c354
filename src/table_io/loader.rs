//! Reads AQI extracts saved as CSV (header row, no index column) into [`RowSet`]s.

use crate::table_io::error::TableIoError;
use crate::types::column::{BaseColumn, ColumnName, BASE_COLUMNS};
use crate::types::record::{AqiRecord, IdentityKey, SiteId};
use crate::types::row_set::RowSet;
use crate::utils::{non_empty, parse_numeric, parse_timestamp};
use log::{debug, info, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tokio::{fs, task};

/// True when `path` ends in `.csv`, in any letter case.
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Base columns absent from `header`, in canonical order.
pub fn missing_base_columns<S: AsRef<str>>(header: &[S]) -> Vec<BaseColumn> {
    BASE_COLUMNS
        .into_iter()
        .filter(|base| !header.iter().any(|name| name.as_ref() == base.as_str()))
        .collect()
}

/// What to do with a non-numeric `aqi` or pollutant cell, such as the `-` or `ND` markers
/// some stations report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericCellPolicy {
    /// Fail the whole extract with [`TableIoError::InvalidValue`].
    #[default]
    Reject,
    /// Leave the cell empty and report it in [`LoadReport::skipped`]. Never coerced to 0.
    LeaveEmpty,
}

/// A non-numeric cell that was left empty under [`NumericCellPolicy::LeaveEmpty`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCell {
    /// 1-based data row, the header not counted.
    pub row: usize,
    pub column: ColumnName,
    pub value: String,
}

/// A parsed extract together with the cells that could not be typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadReport {
    pub table: RowSet,
    pub skipped: Vec<SkippedCell>,
}

/// Parses CSV text into a [`RowSet`].
///
/// `source_name` only labels errors and log lines (usually the file name).
///
/// # Errors
///
/// * [`TableIoError::CsvRead`] if the text is not parseable CSV.
/// * [`TableIoError::MissingColumns`] if the header lacks any base column. Nothing else is
///   parsed in that case.
/// * [`TableIoError::InvalidKey`] / [`TableIoError::InvalidValue`] for a malformed cell.
pub fn read_csv_str(text: &str, source_name: &str) -> Result<RowSet, TableIoError> {
    read_csv_bytes(text.as_bytes().to_vec(), source_name)
}

pub fn read_csv_bytes(bytes: Vec<u8>, source_name: &str) -> Result<RowSet, TableIoError> {
    Ok(read_csv_bytes_with(bytes, source_name, NumericCellPolicy::Reject)?.table)
}

/// Like [`read_csv_str`], handling non-numeric cells according to `policy`.
pub fn read_csv_str_with(
    text: &str,
    source_name: &str,
    policy: NumericCellPolicy,
) -> Result<LoadReport, TableIoError> {
    read_csv_bytes_with(text.as_bytes().to_vec(), source_name, policy)
}

pub fn read_csv_bytes_with(
    bytes: Vec<u8>,
    source_name: &str,
    policy: NumericCellPolicy,
) -> Result<LoadReport, TableIoError> {
    // Every column is read as text; typing happens per cell below.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| TableIoError::CsvRead {
            source_name: source_name.to_string(),
            source: e,
        })?;
    parse_frame(&df, source_name, policy)
}

/// Loads a CSV file from disk. Parsing runs on a blocking task.
pub async fn load_csv_file(path: &Path) -> Result<RowSet, TableIoError> {
    Ok(load_csv_file_with(path, NumericCellPolicy::Reject).await?.table)
}

/// Like [`load_csv_file`], handling non-numeric cells according to `policy`.
pub async fn load_csv_file_with(
    path: &Path,
    policy: NumericCellPolicy,
) -> Result<LoadReport, TableIoError> {
    if !is_csv_path(path) {
        return Err(TableIoError::NotCsv(path.to_path_buf()));
    }
    info!("Loading AQI extract from {:?}", path);
    let bytes = fs::read(path)
        .await
        .map_err(|e| TableIoError::FileRead(path.to_path_buf(), e))?;
    let source_name = path.display().to_string();

    let report =
        task::spawn_blocking(move || read_csv_bytes_with(bytes, &source_name, policy)).await??;
    info!(
        "Loaded {} rows and {} columns from {:?} ({} cells left empty)",
        report.table.len(),
        report.table.columns().len(),
        path,
        report.skipped.len()
    );
    Ok(report)
}

/// Converts a frame of string columns into typed records.
pub fn row_set_from_frame(df: &DataFrame, source_name: &str) -> Result<RowSet, TableIoError> {
    Ok(parse_frame(df, source_name, NumericCellPolicy::Reject)?.table)
}

fn parse_frame(
    df: &DataFrame,
    source_name: &str,
    policy: NumericCellPolicy,
) -> Result<LoadReport, TableIoError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let missing = missing_base_columns(&names);
    if !missing.is_empty() {
        warn!(
            "{} doesn't have the required columns, missing {:?}",
            source_name, missing
        );
        return Err(TableIoError::MissingColumns {
            source_name: source_name.to_string(),
            columns: missing,
        });
    }

    let mut cells: Vec<Vec<Option<String>>> = Vec::with_capacity(names.len());
    for name in &names {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect();
        cells.push(values);
    }

    let columns: Vec<ColumnName> = names.iter().map(|name| ColumnName::parse(name)).collect();
    let position = |base: BaseColumn| {
        columns
            .iter()
            .position(|c| *c == ColumnName::Base(base))
    };
    // Presence was checked above.
    let (Some(site_col), Some(date_col)) = (
        position(BaseColumn::SiteId),
        position(BaseColumn::CreationDate),
    ) else {
        return Err(TableIoError::MissingColumns {
            source_name: source_name.to_string(),
            columns: vec![BaseColumn::SiteId, BaseColumn::CreationDate],
        });
    };

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = Vec::new();
    for row in 0..df.height() {
        let cell = |col: usize| cells[col][row].as_deref().unwrap_or("");
        let key = parse_key(cell(site_col), cell(date_col), row + 1, source_name)?;
        let mut numeric = |raw: &str, column: &ColumnName| -> Result<Option<f64>, TableIoError> {
            match parse_numeric(raw) {
                Ok(value) => Ok(value),
                Err(_) if policy == NumericCellPolicy::LeaveEmpty => {
                    warn!(
                        "Leaving non-numeric '{}' in column '{}', row {} of {} empty",
                        raw,
                        column,
                        row + 1,
                        source_name
                    );
                    skipped.push(SkippedCell {
                        row: row + 1,
                        column: column.clone(),
                        value: raw.to_string(),
                    });
                    Ok(None)
                }
                Err(_) => Err(TableIoError::InvalidValue {
                    source_name: source_name.to_string(),
                    row: row + 1,
                    column: column.to_string(),
                    value: raw.to_string(),
                }),
            }
        };
        let mut record = AqiRecord::builder(key).build();

        for (col, column) in columns.iter().enumerate() {
            let raw = cell(col);
            match column {
                ColumnName::Base(BaseColumn::SiteId | BaseColumn::CreationDate) => {}
                ColumnName::Base(BaseColumn::SiteName) => record.site_name = non_empty(raw),
                ColumnName::Base(BaseColumn::Status) => record.status = non_empty(raw),
                ColumnName::Base(BaseColumn::Aqi) => {
                    record.aqi = numeric(raw, column)?
                }
                ColumnName::Pollutant(p) => {
                    if let Some(value) = numeric(raw, column)? {
                        record.pollutants.insert(*p, value);
                    }
                }
                ColumnName::Extra(name) => {
                    if let Some(value) = non_empty(raw) {
                        record.extras.insert(name.clone(), value);
                    }
                }
            }
        }
        records.push(record);
    }

    debug!("Parsed {} records from {}", records.len(), source_name);
    Ok(LoadReport {
        table: RowSet::new(columns, records),
        skipped,
    })
}

fn parse_key(
    site: &str,
    created: &str,
    row: usize,
    source_name: &str,
) -> Result<IdentityKey, TableIoError> {
    let site_id: SiteId = site.parse().map_err(|_| TableIoError::InvalidKey {
        source_name: source_name.to_string(),
        row,
        column: BaseColumn::SiteId,
        value: site.to_string(),
    })?;
    let created = parse_timestamp(created).ok_or_else(|| TableIoError::InvalidKey {
        source_name: source_name.to_string(),
        row,
        column: BaseColumn::CreationDate,
        value: created.to_string(),
    })?;
    Ok(IdentityKey { site_id, created })
}
