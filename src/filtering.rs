//! Helpers that prepare a merged table for time-series charts.

use crate::types::column::{BaseColumn, ColumnName, Pollutant};
use crate::types::record::SiteId;
use crate::types::row_set::RowSet;
use chrono::NaiveDateTime;
use polars::prelude::{col, lit, DataType, LazyFrame, SortMultipleOptions, TimeUnit};
use std::collections::BTreeSet;

/// Site charted when the user asks for no filter: site 1, Keelung.
pub const DEFAULT_SITE_ID: SiteId = SiteId(1);

pub trait AqiFrameFilterExt {
    /// Keeps the rows of one monitoring site.
    fn filter_site(self, site: SiteId) -> LazyFrame;

    /// Keeps rows whose `datacreationdate` lies in `[start, end]`.
    fn filter_time_range(self, start: NaiveDateTime, end: NaiveDateTime) -> LazyFrame;

    /// Orders rows by site, then ascending time, as line charts expect.
    fn sort_by_time(self) -> LazyFrame;
}

impl AqiFrameFilterExt for LazyFrame {
    fn filter_site(self, site: SiteId) -> LazyFrame {
        self.filter(col("siteid").eq(lit(site.0)))
    }

    fn filter_time_range(self, start: NaiveDateTime, end: NaiveDateTime) -> LazyFrame {
        let created = || {
            col("datacreationdate").cast(DataType::Datetime(TimeUnit::Milliseconds, None))
        };
        self.filter(created().gt_eq(lit(start)).and(created().lt_eq(lit(end))))
    }

    fn sort_by_time(self) -> LazyFrame {
        self.sort(["siteid", "datacreationdate"], SortMultipleOptions::default())
    }
}

/// Which readings a chart draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartSelection {
    /// The AQI of the site only, the chart drawn when nothing is chosen.
    #[default]
    Aqi,
    Pollutant(Pollutant),
    /// Every pollutant the table declares.
    AllPollutants,
}

impl ChartSelection {
    /// Parses `aqi`, `all` or a pollutant name such as `pm2.5`, in any letter case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("aqi") {
            Some(Self::Aqi)
        } else if name.eq_ignore_ascii_case("all") {
            Some(Self::AllPollutants)
        } else {
            Pollutant::from_name(name).map(Self::Pollutant)
        }
    }

    /// Column names to plot from `table`. `AllPollutants` falls back to `aqi` when the table
    /// declares no pollutant.
    pub fn series(&self, table: &RowSet) -> Vec<&'static str> {
        match self {
            Self::Aqi => vec![BaseColumn::Aqi.as_str()],
            Self::Pollutant(p) => vec![p.as_str()],
            Self::AllPollutants => {
                let all: Vec<&'static str> =
                    plottable_pollutants(table).iter().map(|p| p.as_str()).collect();
                if all.is_empty() {
                    vec![BaseColumn::Aqi.as_str()]
                } else {
                    all
                }
            }
        }
    }
}

/// Distinct site ids in the table, ascending.
pub fn available_site_ids(table: &RowSet) -> Vec<SiteId> {
    table
        .records()
        .iter()
        .map(|r| r.key.site_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Pollutant columns the table declares, in header order.
pub fn plottable_pollutants(table: &RowSet) -> Vec<Pollutant> {
    table
        .columns()
        .iter()
        .filter_map(|c| match c {
            ColumnName::Pollutant(p) => Some(*p),
            _ => None,
        })
        .collect()
}

/// First non-empty site name recorded for `site`, used for chart titles.
pub fn site_name(table: &RowSet, site: SiteId) -> Option<&str> {
    table
        .records()
        .iter()
        .filter(|r| r.key.site_id == site)
        .find_map(|r| r.site_name.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{AqiRecord, IdentityKey};
    use crate::utils::parse_timestamp;
    use polars::prelude::IntoLazy;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    fn table() -> RowSet {
        let record = |site: u32, at: &str, name: &str| {
            AqiRecord::builder(IdentityKey::new(site, ts(at)))
                .site_name(name)
                .aqi(30.0)
                .status("Good")
                .build()
                .with_pollutant(Pollutant::O3, 40.0)
        };
        RowSet::with_pollutants(
            &[Pollutant::O3, Pollutant::Pm10],
            vec![
                record(3, "2024-05-01 02:00", "Wanli"),
                record(1, "2024-05-01 02:00", "Keelung"),
                record(1, "2024-05-01 00:00", "Keelung"),
                record(1, "2024-05-01 01:00", "Keelung"),
            ],
        )
    }

    #[test]
    fn test_filter_site_and_sort() {
        let df = table()
            .to_dataframe()
            .unwrap()
            .lazy()
            .filter_site(DEFAULT_SITE_ID)
            .sort_by_time()
            .collect()
            .unwrap();
        assert_eq!(df.height(), 3);

        let physical = df
            .column("datacreationdate")
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Int64)
            .unwrap();
        let instants: Vec<i64> = physical.i64().unwrap().into_iter().flatten().collect();
        assert_eq!(instants.len(), 3);
        assert!(instants.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_filter_time_range_inclusive() {
        let df = table()
            .to_dataframe()
            .unwrap()
            .lazy()
            .filter_time_range(ts("2024-05-01 01:00"), ts("2024-05-01 02:00"))
            .collect()
            .unwrap();
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_plot_helpers() {
        let table = table();
        assert_eq!(available_site_ids(&table), vec![SiteId(1), SiteId(3)]);
        assert_eq!(plottable_pollutants(&table), vec![Pollutant::O3, Pollutant::Pm10]);
        assert_eq!(site_name(&table, SiteId(3)), Some("Wanli"));
        assert_eq!(site_name(&table, SiteId(9)), None);
    }

    #[test]
    fn test_chart_selection() {
        assert_eq!(ChartSelection::default(), ChartSelection::Aqi);
        assert_eq!(ChartSelection::from_name("ALL"), Some(ChartSelection::AllPollutants));
        assert_eq!(
            ChartSelection::from_name("PM2.5"),
            Some(ChartSelection::Pollutant(Pollutant::Pm25))
        );
        assert_eq!(ChartSelection::from_name("humidity"), None);

        let table = table();
        assert_eq!(ChartSelection::Aqi.series(&table), vec!["aqi"]);
        assert_eq!(ChartSelection::Pollutant(Pollutant::No2).series(&table), vec!["no2"]);
        assert_eq!(ChartSelection::AllPollutants.series(&table), vec!["o3", "pm10"]);
        assert_eq!(ChartSelection::AllPollutants.series(&RowSet::default()), vec!["aqi"]);
    }
}
