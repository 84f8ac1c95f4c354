//! Fetch, merge and chart-prepare hourly air-quality (AQI) extracts from Taiwan's
//! Ministry of Environment open data API.
//!
//! The API serves at most 1000 rows per call, so a longer period arrives as several CSV
//! extracts. [`TableMerger`] combines them into one table keyed on (site id, creation
//! timestamp), without duplicates and in a deterministic order.
//!
//! ```
//! use aqi_merge::{read_csv_str, TableMerger, AqiError};
//!
//! # fn main() -> Result<(), AqiError> {
//! let first = read_csv_str(
//!     "siteid,sitename,datacreationdate,aqi,status,pm2.5\n1,Keelung,2024-05-01 00:00,30,Good,10\n",
//!     "first.csv",
//! )?;
//! let second = read_csv_str(
//!     "siteid,sitename,datacreationdate,aqi,status,so2\n1,Keelung,2024-05-01 00:00,30,Good,5\n",
//!     "second.csv",
//! )?;
//!
//! let outcome = TableMerger::default().merge(&[first, second])?;
//! assert_eq!(outcome.table.len(), 1);
//! assert_eq!(
//!     outcome.table.header(),
//!     vec!["siteid", "sitename", "datacreationdate", "aqi", "status", "pm2.5", "so2"]
//! );
//! # Ok(())
//! # }
//! ```

mod api;
mod error;
mod filtering;
mod merge;
mod table_io;
mod types;
mod utils;

pub use error::AqiError;

pub use merge::error::{MergeError, ValueConflict};
pub use merge::table_merger::{MergeOutcome, TableMerger, DEFAULT_MAX_ROWS};

pub use types::column::{BaseColumn, ColumnName, Pollutant, BASE_COLUMNS};
pub use types::record::{AqiRecord, IdentityKey, SiteId};
pub use types::row_set::RowSet;

pub use table_io::error::TableIoError;
pub use table_io::loader::{
    is_csv_path, load_csv_file, load_csv_file_with, missing_base_columns, read_csv_bytes,
    read_csv_bytes_with, read_csv_str, read_csv_str_with, row_set_from_frame, LoadReport,
    NumericCellPolicy, SkippedCell,
};

pub use api::client::{AqiClient, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_PAGE_LIMIT};
pub use api::error::ApiError;
pub use api::range::{export_file_name, validate_range, AvailableRange};
pub use api::records::{to_row_set, ApiRecord, ApiResponse};

pub use filtering::{
    available_site_ids, plottable_pollutants, site_name, AqiFrameFilterExt, ChartSelection,
    DEFAULT_SITE_ID,
};
pub use utils::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
