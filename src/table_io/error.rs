use crate::types::column::BaseColumn;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableIoError {
    #[error("Failed to read CSV file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error("'{0}' is not a .csv file")]
    NotCsv(PathBuf),

    #[error("Parsing error processing CSV data from '{source_name}'")]
    CsvRead {
        source_name: String,
        #[source]
        source: PolarsError,
    },

    #[error("'{source_name}' is missing required column(s): {}", .columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<BaseColumn>,
    },

    #[error("Invalid {column} '{value}' in row {row} of '{source_name}'")]
    InvalidKey {
        source_name: String,
        row: usize,
        column: BaseColumn,
        value: String,
    },

    #[error("Non-numeric value '{value}' in column '{column}', row {row} of '{source_name}'")]
    InvalidValue {
        source_name: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
