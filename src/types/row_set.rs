use crate::types::column::{BaseColumn, ColumnName, Pollutant, BASE_COLUMNS};
use crate::types::record::{AqiRecord, IdentityKey};
use std::collections::BTreeSet;

/// An ordered sequence of [`AqiRecord`]s together with the header it was read with.
///
/// The header decides which columns a row-set *declares*. A record may still hold an
/// empty cell for a declared column. Whether all base columns are declared is checked by
/// [`RowSet::missing_base_columns`], not at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSet {
    columns: Vec<ColumnName>,
    records: Vec<AqiRecord>,
}

impl RowSet {
    /// Creates a row-set. Duplicate header entries are dropped, keeping the first.
    ///
    /// A pollutant or extra column that some record holds a value for but `columns` does
    /// not list is appended to the header, in the order records first mention it, so no
    /// held value is left out of the table.
    pub fn new(columns: Vec<ColumnName>, records: Vec<AqiRecord>) -> Self {
        let mut deduped: Vec<ColumnName> = Vec::with_capacity(columns.len());
        let held = records.iter().flat_map(|record| {
            record
                .pollutants
                .keys()
                .copied()
                .map(ColumnName::Pollutant)
                .chain(record.extras.keys().cloned().map(ColumnName::Extra))
        });
        for column in columns.into_iter().chain(held) {
            if !deduped.contains(&column) {
                deduped.push(column);
            }
        }
        Self {
            columns: deduped,
            records,
        }
    }

    /// A row-set declaring the five base columns followed by `pollutants`.
    pub fn with_pollutants(pollutants: &[Pollutant], records: Vec<AqiRecord>) -> Self {
        let columns = BASE_COLUMNS
            .into_iter()
            .map(ColumnName::Base)
            .chain(pollutants.iter().copied().map(ColumnName::Pollutant))
            .collect();
        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    pub fn records(&self) -> &[AqiRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AqiRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnName::as_str).collect()
    }

    /// Base columns absent from the header, in canonical order.
    pub fn missing_base_columns(&self) -> Vec<BaseColumn> {
        BASE_COLUMNS
            .into_iter()
            .filter(|base| !self.columns.contains(&ColumnName::Base(*base)))
            .collect()
    }

    /// Declared non-base columns in header order.
    pub fn extra_columns(&self) -> impl Iterator<Item = &ColumnName> {
        self.columns.iter().filter(|c| !c.is_base())
    }

    pub fn keys(&self) -> BTreeSet<IdentityKey> {
        self.records.iter().map(|r| r.key).collect()
    }
}
