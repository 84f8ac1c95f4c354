use crate::types::column::{BaseColumn, ColumnName};
use crate::types::record::IdentityKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("At least two row-sets are required to merge, got {supplied}")]
    EmptyInput { supplied: usize },

    #[error("Row-set {index} is missing required column '{column}'")]
    Schema { index: usize, column: BaseColumn },

    #[error("Combined row count {rows} exceeds the configured limit of {limit}")]
    ResourceLimit { rows: usize, limit: usize },
}

/// Two sources disagree on a non-key value for the same identity key.
///
/// Conflicts do not abort a merge: the first-seen value is kept and the conflict is
/// reported in [`crate::MergeOutcome::conflicts`].
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Conflicting '{column}' for {key}: kept '{kept}', ignored '{ignored}' from row-set {source_index}")]
pub struct ValueConflict {
    pub key: IdentityKey,
    pub column: ColumnName,
    pub kept: String,
    pub ignored: String,
    /// Position of the row-set that supplied the ignored value.
    pub source_index: usize,
}
