//! Turns a [`RowSet`] back into a typed polars [`DataFrame`] or CSV text.

use crate::table_io::error::TableIoError;
use crate::table_io::loader::is_csv_path;
use crate::types::column::{BaseColumn, ColumnName};
use crate::types::row_set::RowSet;
use crate::utils::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use log::info;
use polars::prelude::*;
use std::io::Write;
use std::path::Path;
use tokio::task;

impl RowSet {
    /// Builds a [`DataFrame`] with one column per declared column, in header order.
    ///
    /// `siteid` becomes `u32`, `datacreationdate` a datetime, `aqi` and pollutants `f64`,
    /// everything else a string column. Empty cells are nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame, TableIoError> {
        let records = self.records();
        let columns: Vec<Column> = self
            .columns()
            .iter()
            .map(|column| {
                let name: PlSmallStr = column.as_str().into();
                match column {
                    ColumnName::Base(BaseColumn::SiteId) => {
                        let ids: Vec<u32> = records.iter().map(|r| r.key.site_id.0).collect();
                        Column::new(name, ids)
                    }
                    ColumnName::Base(BaseColumn::CreationDate) => {
                        let created: Vec<NaiveDateTime> =
                            records.iter().map(|r| r.key.created).collect();
                        Column::new(name, created)
                    }
                    ColumnName::Base(BaseColumn::Aqi) => {
                        let aqi: Vec<Option<f64>> = records.iter().map(|r| r.aqi).collect();
                        Column::new(name, aqi)
                    }
                    ColumnName::Pollutant(p) => {
                        let values: Vec<Option<f64>> =
                            records.iter().map(|r| r.pollutant(*p)).collect();
                        Column::new(name, values)
                    }
                    ColumnName::Base(BaseColumn::SiteName | BaseColumn::Status)
                    | ColumnName::Extra(_) => {
                        let values: Vec<Option<String>> =
                            records.iter().map(|r| r.value_text(column)).collect();
                        Column::new(name, values)
                    }
                }
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Serializes to CSV: header row first, one line per record, no index column,
    /// timestamps as `YYYY-MM-DD HH:MM`.
    pub fn to_csv_string(&self) -> Result<String, TableIoError> {
        let mut buffer = Vec::new();
        write_frame_csv(&mut self.to_dataframe()?, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the CSV text to `path`, which must carry a `.csv` extension.
    /// An existing file is overwritten.
    ///
    /// Frame building and serialization run on the blocking thread pool.
    pub async fn write_csv(&self, path: &Path) -> Result<(), TableIoError> {
        if !is_csv_path(path) {
            return Err(TableIoError::NotCsv(path.to_path_buf()));
        }
        let table = self.clone();
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut df = table.to_dataframe()?;
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| TableIoError::FileWrite(path_buf.clone(), e))?;
            write_frame_csv(&mut df, file)?;
            Ok::<(), TableIoError>(())
        })
        .await??;
        info!("Wrote {} records to {:?}", self.len(), path);
        Ok(())
    }
}

fn write_frame_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<(), TableIoError> {
    CsvWriter::new(writer)
        .include_header(true)
        .with_datetime_format(Some(TIMESTAMP_FORMAT.to_string()))
        .finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_io::loader::{load_csv_file, read_csv_str};
    use crate::types::column::Pollutant;
    use crate::types::record::{AqiRecord, IdentityKey};
    use crate::utils::parse_timestamp;

    fn sample() -> RowSet {
        let ts = parse_timestamp("2024-05-01 00:00").unwrap();
        RowSet::new(
            vec![
                BaseColumn::SiteId.into(),
                BaseColumn::SiteName.into(),
                BaseColumn::CreationDate.into(),
                BaseColumn::Aqi.into(),
                BaseColumn::Status.into(),
                Pollutant::Pm25.into(),
                ColumnName::Extra("county".to_string()),
            ],
            vec![
                AqiRecord::builder(IdentityKey::new(1, ts))
                    .site_name("Keelung")
                    .aqi(30.0)
                    .status("Good")
                    .build()
                    .with_pollutant(Pollutant::Pm25, 10.0)
                    .with_extra("county", "Keelung City"),
                AqiRecord::builder(IdentityKey::new(2, ts))
                    .site_name("Xizhi")
                    .status("Good")
                    .build(),
            ],
        )
    }

    #[test]
    fn test_to_dataframe_types() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 7));
        assert_eq!(df.column("siteid").unwrap().dtype(), &DataType::UInt32);
        assert!(matches!(
            df.column("datacreationdate").unwrap().dtype(),
            DataType::Datetime(_, None)
        ));
        assert_eq!(df.column("pm2.5").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("county").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("aqi").unwrap().null_count(), 1);
    }

    #[test]
    fn test_to_csv_string_layout() {
        let text = sample().to_csv_string().unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("siteid,sitename,datacreationdate,aqi,status,pm2.5,county")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("1,Keelung,2024-05-01 00:00,30"), "{first}");
        assert!(first.contains(",Good,10"), "{first}");
        assert!(first.ends_with(",Keelung City"), "{first}");
        assert_eq!(lines.next(), Some("2,Xizhi,2024-05-01 00:00,,Good,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_text_reads_back() {
        let original = sample();
        let reread = read_csv_str(&original.to_csv_string().unwrap(), "reread.csv").unwrap();
        assert_eq!(reread, original);
    }

    #[tokio::test]
    async fn test_write_csv() -> Result<(), TableIoError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        sample().write_csv(&path).await?;
        assert_eq!(load_csv_file(&path).await?.len(), 2);

        let not_csv = dir.path().join("merged");
        assert!(matches!(
            sample().write_csv(&not_csv).await,
            Err(TableIoError::NotCsv(_))
        ));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_write_csv_replaces_existing_file() -> Result<(), TableIoError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        let table = sample();
        table.write_csv(&path).await?;

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, table.to_csv_string()?);
        assert_eq!(load_csv_file(&path).await?, table);
        Ok(())
    }
}
