//! Typed AQI records and their identity key.

use crate::types::column::{BaseColumn, ColumnName, Pollutant};
use crate::utils::format_timestamp;
use bon::bon;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Numeric monitoring site identifier (`siteid`). Orders numerically, so site 2 sorts before site 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

impl FromStr for SiteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SiteId)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (site id, creation timestamp) pair identifying a reading across extracts.
///
/// Ordering is by site id, then timestamp, which is the order of merged output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub site_id: SiteId,
    pub created: NaiveDateTime,
}

impl IdentityKey {
    pub fn new(site_id: u32, created: NaiveDateTime) -> Self {
        Self {
            site_id: SiteId(site_id),
            created,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site {} at {}", self.site_id, format_timestamp(&self.created))
    }
}

/// One hourly reading of one monitoring site.
///
/// Empty cells are represented by `None` for base fields and by a missing entry in the
/// `pollutants` and `extras` maps.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiRecord {
    pub key: IdentityKey,
    pub site_name: Option<String>,
    pub aqi: Option<f64>,
    pub status: Option<String>,
    pub pollutants: BTreeMap<Pollutant, f64>,
    /// Columns outside the known vocabulary, kept as raw text.
    pub extras: BTreeMap<String, String>,
}

#[bon]
impl AqiRecord {
    #[builder]
    pub fn new(
        #[builder(start_fn)] key: IdentityKey,
        #[builder(into)] site_name: Option<String>,
        aqi: Option<f64>,
        #[builder(into)] status: Option<String>,
    ) -> Self {
        Self {
            key,
            site_name,
            aqi,
            status,
            pollutants: BTreeMap::new(),
            extras: BTreeMap::new(),
        }
    }
}

impl AqiRecord {
    pub fn with_pollutant(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.pollutants.insert(pollutant, value);
        self
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(column.into(), value.into());
        self
    }

    pub fn pollutant(&self, pollutant: Pollutant) -> Option<f64> {
        self.pollutants.get(&pollutant).copied()
    }

    /// Cell text for `column`, `None` when the cell is empty.
    pub fn value_text(&self, column: &ColumnName) -> Option<String> {
        match column {
            ColumnName::Base(BaseColumn::SiteId) => Some(self.key.site_id.to_string()),
            ColumnName::Base(BaseColumn::CreationDate) => Some(format_timestamp(&self.key.created)),
            ColumnName::Base(BaseColumn::SiteName) => self.site_name.clone(),
            ColumnName::Base(BaseColumn::Aqi) => self.aqi.map(|v| v.to_string()),
            ColumnName::Base(BaseColumn::Status) => self.status.clone(),
            ColumnName::Pollutant(p) => self.pollutant(*p).map(|v| v.to_string()),
            ColumnName::Extra(name) => self.extras.get(name).cloned(),
        }
    }

    /// Fills every empty cell of `self` from `other`, which must share the same key.
    ///
    /// A non-empty value is never replaced. When both sides hold different non-empty
    /// values, `self` keeps its value and `on_conflict(column, kept, ignored)` is called.
    pub(crate) fn merge_from(
        &mut self,
        other: &Self,
        mut on_conflict: impl FnMut(ColumnName, String, String),
    ) {
        debug_assert_eq!(self.key, other.key);

        fill(&mut self.site_name, &other.site_name, |kept, ignored| {
            on_conflict(BaseColumn::SiteName.into(), kept.clone(), ignored.clone())
        });
        fill(&mut self.aqi, &other.aqi, |kept, ignored| {
            on_conflict(BaseColumn::Aqi.into(), kept.to_string(), ignored.to_string())
        });
        fill(&mut self.status, &other.status, |kept, ignored| {
            on_conflict(BaseColumn::Status.into(), kept.clone(), ignored.clone())
        });

        for (pollutant, incoming) in &other.pollutants {
            match self.pollutants.get(pollutant) {
                None => {
                    self.pollutants.insert(*pollutant, *incoming);
                }
                Some(kept) if kept != incoming => {
                    on_conflict((*pollutant).into(), kept.to_string(), incoming.to_string())
                }
                Some(_) => {}
            }
        }

        for (column, incoming) in &other.extras {
            match self.extras.get(column) {
                None => {
                    self.extras.insert(column.clone(), incoming.clone());
                }
                Some(kept) if kept != incoming => on_conflict(
                    ColumnName::Extra(column.clone()),
                    kept.clone(),
                    incoming.clone(),
                ),
                Some(_) => {}
            }
        }
    }
}

fn fill<T: Clone + PartialEq>(slot: &mut Option<T>, incoming: &Option<T>, on_conflict: impl FnOnce(&T, &T)) {
    match (slot.as_ref(), incoming) {
        (None, Some(value)) => *slot = Some(value.clone()),
        (Some(kept), Some(value)) if kept != value => on_conflict(kept, value),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;

    fn key(site: u32, ts: &str) -> IdentityKey {
        IdentityKey::new(site, parse_timestamp(ts).unwrap())
    }

    #[test]
    fn test_identity_key_orders_by_site_then_time() {
        let mut keys = vec![
            key(10, "2024-05-01 00:00"),
            key(2, "2024-05-01 01:00"),
            key(2, "2024-05-01 00:00"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                key(2, "2024-05-01 00:00"),
                key(2, "2024-05-01 01:00"),
                key(10, "2024-05-01 00:00"),
            ]
        );
        assert_eq!(keys[0].to_string(), "site 2 at 2024-05-01 00:00");
    }

    #[test]
    fn test_merge_from_fills_empty_cells() {
        let k = key(1, "2024-05-01 00:00");
        let mut left = AqiRecord::builder(k)
            .site_name("Keelung")
            .status("Good")
            .build()
            .with_pollutant(Pollutant::Pm25, 10.0);
        let right = AqiRecord::builder(k)
            .aqi(30.0)
            .status("Good")
            .build()
            .with_pollutant(Pollutant::So2, 5.0)
            .with_extra("county", "Keelung City");

        let mut conflicts = Vec::new();
        left.merge_from(&right, |c, kept, ignored| conflicts.push((c, kept, ignored)));

        assert!(conflicts.is_empty());
        assert_eq!(left.aqi, Some(30.0));
        assert_eq!(left.pollutant(Pollutant::Pm25), Some(10.0));
        assert_eq!(left.pollutant(Pollutant::So2), Some(5.0));
        assert_eq!(left.extras.get("county").map(String::as_str), Some("Keelung City"));
    }

    #[test]
    fn test_merge_from_keeps_first_seen_on_conflict() {
        let k = key(1, "2024-05-01 00:00");
        let mut left = AqiRecord::builder(k).aqi(30.0).build();
        let right = AqiRecord::builder(k).aqi(40.0).build();

        let mut conflicts = Vec::new();
        left.merge_from(&right, |c, kept, ignored| conflicts.push((c, kept, ignored)));

        assert_eq!(left.aqi, Some(30.0));
        assert_eq!(
            conflicts,
            vec![(ColumnName::Base(BaseColumn::Aqi), "30".to_string(), "40".to_string())]
        );
    }

    #[test]
    fn test_merge_from_never_blanks_a_value() {
        let k = key(3, "2024-05-01 00:00");
        let mut left = AqiRecord::builder(k).site_name("Wanli").build();
        let right = AqiRecord::builder(k).build();
        left.merge_from(&right, |_, _, _| panic!("no conflict expected"));
        assert_eq!(left.site_name.as_deref(), Some("Wanli"));
    }

    #[test]
    fn test_value_text() {
        let record = AqiRecord::builder(key(1, "2024-05-01 00:00"))
            .aqi(30.0)
            .build()
            .with_pollutant(Pollutant::Co, 0.25);
        assert_eq!(record.value_text(&BaseColumn::Aqi.into()).as_deref(), Some("30"));
        assert_eq!(
            record.value_text(&BaseColumn::CreationDate.into()).as_deref(),
            Some("2024-05-01 00:00")
        );
        assert_eq!(record.value_text(&Pollutant::Co.into()).as_deref(), Some("0.25"));
        assert_eq!(record.value_text(&BaseColumn::Status.into()), None);
    }
}
