//! Outer union of several AQI extracts over the (site id, creation timestamp) key.
//!
//! The MOENV API returns at most 1000 rows per call, so a longer period is downloaded
//! as several extracts, possibly with different pollutant selections. [`TableMerger`]
//! folds them back into one table: one record per identity key, every column of every
//! input, base columns first, rows sorted by key.

use crate::merge::error::{MergeError, ValueConflict};
use crate::types::column::{ColumnName, BASE_COLUMNS};
use crate::types::record::{AqiRecord, IdentityKey};
use crate::types::row_set::RowSet;
use bon::bon;
use log::{debug, info, warn};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

/// Default cap on the combined number of input rows.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: RowSet,
    /// Every disagreement found, in the order it was encountered.
    pub conflicts: Vec<ValueConflict>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Merges row-sets that share the base AQI schema.
///
/// # Examples
///
/// ```
/// use aqi_merge::{MergeError, RowSet, TableMerger};
///
/// let merger = TableMerger::builder().max_rows(5_000).build();
/// // A single row-set is not a merge.
/// assert_eq!(
///     merger.merge(&[RowSet::default()]),
///     Err(MergeError::EmptyInput { supplied: 1 })
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TableMerger {
    max_rows: usize,
}

impl Default for TableMerger {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

#[bon]
impl TableMerger {
    /// Creates a merger.
    ///
    /// # Arguments
    ///
    /// * `max_rows` - Upper bound on the combined row count of all inputs. Merges above it
    ///   fail with [`MergeError::ResourceLimit`] before anything is allocated for the output.
    ///   Defaults to [`DEFAULT_MAX_ROWS`].
    #[builder]
    pub fn new(#[builder(default = DEFAULT_MAX_ROWS)] max_rows: usize) -> Self {
        Self { max_rows }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Merges `inputs` into one table.
    ///
    /// The first row-set seeds the accumulator and every later one is outer-joined into it
    /// on [`IdentityKey`]. Empty cells are filled from later inputs, non-empty cells are
    /// never overwritten. Disagreements keep the first-seen value and are returned in
    /// [`MergeOutcome::conflicts`].
    ///
    /// # Errors
    ///
    /// All checks run before any merge work:
    /// * [`MergeError::EmptyInput`] if fewer than two row-sets are given.
    /// * [`MergeError::Schema`] for the first row-set whose header lacks a base column.
    /// * [`MergeError::ResourceLimit`] if the inputs together exceed `max_rows` rows.
    pub fn merge(&self, inputs: &[RowSet]) -> Result<MergeOutcome, MergeError> {
        if inputs.len() < 2 {
            return Err(MergeError::EmptyInput {
                supplied: inputs.len(),
            });
        }

        for (index, input) in inputs.iter().enumerate() {
            if let Some(column) = input.missing_base_columns().into_iter().next() {
                warn!("Row-set {} is missing base column '{}'", index, column);
                return Err(MergeError::Schema { index, column });
            }
        }

        let rows: usize = inputs.iter().map(RowSet::len).sum();
        if rows > self.max_rows {
            warn!(
                "Refusing to merge {} rows from {} row-sets, limit is {}",
                rows,
                inputs.len(),
                self.max_rows
            );
            return Err(MergeError::ResourceLimit {
                rows,
                limit: self.max_rows,
            });
        }

        info!("Merging {} row-sets with {} rows in total", inputs.len(), rows);

        let columns = merged_columns(inputs);
        let mut conflicts = Vec::new();
        let mut merged: BTreeMap<IdentityKey, AqiRecord> = BTreeMap::new();

        for (source_index, input) in inputs.iter().enumerate() {
            let before = merged.len();
            for record in input.records() {
                match merged.entry(record.key) {
                    Entry::Vacant(entry) => {
                        entry.insert(record.clone());
                    }
                    Entry::Occupied(mut entry) => {
                        let key = record.key;
                        entry.get_mut().merge_from(record, |column, kept, ignored| {
                            let conflict = ValueConflict {
                                key,
                                column,
                                kept,
                                ignored,
                                source_index,
                            };
                            warn!("{}", conflict);
                            conflicts.push(conflict);
                        });
                    }
                }
            }
            debug!(
                "Row-set {} contributed {} new keys ({} rows)",
                source_index,
                merged.len() - before,
                input.len()
            );
        }

        info!(
            "Merged into {} records with {} columns, {} conflicts",
            merged.len(),
            columns.len(),
            conflicts.len()
        );

        Ok(MergeOutcome {
            table: RowSet::new(columns, merged.into_values().collect()),
            conflicts,
        })
    }
}

/// Base columns in canonical order, then all other columns in first-seen order.
fn merged_columns(inputs: &[RowSet]) -> Vec<ColumnName> {
    let mut columns: Vec<ColumnName> = BASE_COLUMNS.into_iter().map(ColumnName::Base).collect();
    let mut seen: HashSet<&ColumnName> = HashSet::new();
    let mut rest = Vec::new();
    for column in inputs.iter().flat_map(RowSet::extra_columns) {
        if seen.insert(column) {
            rest.push(column.clone());
        }
    }
    columns.extend(rest);
    columns
}
