//! Column vocabulary of an AQI extract: the five base columns every row-set must carry,
//! the closed set of pollutant readings, and everything else as named extras.

use std::fmt;

/// One of the five columns every AQI row-set must declare.
///
/// The declaration order of the variants is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseColumn {
    /// `siteid`, the numeric monitoring site identifier.
    SiteId,
    /// `sitename`, e.g. "Keelung".
    SiteName,
    /// `datacreationdate`, the `YYYY-MM-DD HH:MM` timestamp of the reading.
    CreationDate,
    /// `aqi`, the composite air-quality index.
    Aqi,
    /// `status`, the textual AQI band ("Good", "Moderate", ...).
    Status,
}

/// All base columns in canonical order.
pub const BASE_COLUMNS: [BaseColumn; 5] = [
    BaseColumn::SiteId,
    BaseColumn::SiteName,
    BaseColumn::CreationDate,
    BaseColumn::Aqi,
    BaseColumn::Status,
];

impl BaseColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseColumn::SiteId => "siteid",
            BaseColumn::SiteName => "sitename",
            BaseColumn::CreationDate => "datacreationdate",
            BaseColumn::Aqi => "aqi",
            BaseColumn::Status => "status",
        }
    }

    /// Exact (case-sensitive) name match.
    pub fn from_name(name: &str) -> Option<Self> {
        BASE_COLUMNS.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for BaseColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pollutant reading the download tool lets users select.
///
/// Values are numeric concentrations. Any other non-base column of an extract
/// is kept as a [`ColumnName::Extra`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pollutant {
    /// Fine particulate matter, `pm2.5`.
    Pm25,
    /// Sulphur dioxide, `so2`.
    So2,
    /// Ozone, `o3`.
    O3,
    /// Carbon monoxide, `co`.
    Co,
    /// Particulate matter, `pm10`.
    Pm10,
    /// Nitrogen dioxide, `no2`.
    No2,
    /// Nitric oxide, `no`.
    No,
}

impl Pollutant {
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm25,
        Pollutant::So2,
        Pollutant::O3,
        Pollutant::Co,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::No,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2.5",
            Pollutant::So2 => "so2",
            Pollutant::O3 => "o3",
            Pollutant::Co => "co",
            Pollutant::Pm10 => "pm10",
            Pollutant::No2 => "no2",
            Pollutant::No => "no",
        }
    }

    /// Case-insensitive lookup, so `PM2.5` typed by a user resolves too.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == lowered)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any column of a row-set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnName {
    Base(BaseColumn),
    Pollutant(Pollutant),
    /// A column outside the known vocabulary (e.g. `county`, `wind_speed`), kept verbatim.
    Extra(String),
}

impl ColumnName {
    /// Classifies a raw header name. Base columns match exactly, pollutants match
    /// exactly as well so that a header like `PM2.5` stays a separate extra column.
    pub fn parse(name: &str) -> Self {
        if let Some(base) = BaseColumn::from_name(name) {
            ColumnName::Base(base)
        } else if let Some(p) = Pollutant::ALL.into_iter().find(|p| p.as_str() == name) {
            ColumnName::Pollutant(p)
        } else {
            ColumnName::Extra(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnName::Base(b) => b.as_str(),
            ColumnName::Pollutant(p) => p.as_str(),
            ColumnName::Extra(name) => name,
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, ColumnName::Base(_))
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BaseColumn> for ColumnName {
    fn from(value: BaseColumn) -> Self {
        ColumnName::Base(value)
    }
}

impl From<Pollutant> for ColumnName {
    fn from(value: Pollutant) -> Self {
        ColumnName::Pollutant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_columns() {
        assert_eq!(ColumnName::parse("siteid"), ColumnName::Base(BaseColumn::SiteId));
        assert_eq!(
            ColumnName::parse("datacreationdate"),
            ColumnName::Base(BaseColumn::CreationDate)
        );
        assert_eq!(ColumnName::parse("pm2.5"), ColumnName::Pollutant(Pollutant::Pm25));
        assert_eq!(
            ColumnName::parse("wind_speed"),
            ColumnName::Extra("wind_speed".to_string())
        );
        // Header matching is exact.
        assert_eq!(ColumnName::parse("SiteId"), ColumnName::Extra("SiteId".to_string()));
    }

    #[test]
    fn test_pollutant_from_user_input() {
        assert_eq!(Pollutant::from_name(" PM2.5 "), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("no"), Some(Pollutant::No));
        assert_eq!(Pollutant::from_name("nox"), None);
    }

    #[test]
    fn test_base_columns_canonical_order() {
        let names: Vec<_> = BASE_COLUMNS.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["siteid", "sitename", "datacreationdate", "aqi", "status"]
        );
        let mut sorted = BASE_COLUMNS;
        sorted.sort();
        assert_eq!(sorted, BASE_COLUMNS);
    }
}
