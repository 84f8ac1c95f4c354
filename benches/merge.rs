use aqi_merge::{AqiRecord, IdentityKey, Pollutant, RowSet, TableMerger};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// One extract of `hours` hourly readings for 80 sites, as the API pages them.
fn extract(hours: i64, pollutant: Pollutant, value: f64) -> RowSet {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start");
    let records = (0..hours)
        .flat_map(|h| {
            (1..=80).map(move |site| {
                AqiRecord::builder(IdentityKey::new(site, start + Duration::hours(h)))
                    .site_name(format!("site {site}"))
                    .aqi(30.0)
                    .status("Good")
                    .build()
                    .with_pollutant(pollutant, value)
            })
        })
        .collect();
    RowSet::with_pollutants(&[pollutant], records)
}

fn bench_merge(c: &mut Criterion) {
    let inputs = vec![
        extract(12, Pollutant::Pm25, 10.0),
        extract(12, Pollutant::So2, 1.5),
        extract(12, Pollutant::O3, 35.0),
    ];
    let merger = TableMerger::default();
    c.bench_function("merge_three_extracts", |b| {
        b.iter(|| merger.merge(black_box(&inputs)))
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
