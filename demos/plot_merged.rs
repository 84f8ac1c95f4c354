//! demos/plot_merged.rs
//!
//! Plots readings of one site from a merged AQI file.
//!
//! cargo run --example plot_merged --features plotting -- merged.csv [siteid] [aqi|pollutant|all]
//!
//! Without further arguments the AQI of site 1 (Keelung) is drawn.

use aqi_merge::{
    available_site_ids, load_csv_file, site_name, AqiFrameFilterExt, ChartSelection, SiteId,
    DEFAULT_SITE_ID,
};
use plotlars::{Plot, Text, TimeSeriesPlot};
use polars::prelude::*;
use std::error::Error;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(
        args.next()
            .ok_or("usage: plot_merged <file.csv> [siteid] [aqi|pollutant|all]")?,
    );
    let site = match args.next() {
        Some(raw) => raw.parse::<SiteId>()?,
        None => DEFAULT_SITE_ID,
    };
    let selection = match args.next() {
        Some(raw) => ChartSelection::from_name(&raw)
            .ok_or_else(|| format!("'{}' is neither aqi, all nor a known pollutant", raw))?,
        None => ChartSelection::default(),
    };

    let table = load_csv_file(&path).await?;
    println!("Available site ids in the file: {:?}", available_site_ids(&table));

    let series = selection.series(&table);
    let header = table.header();
    if let Some(missing) = series.iter().find(|name| !header.contains(name)) {
        return Err(format!("{} has no '{}' column", path.display(), missing).into());
    }

    let label = match selection {
        ChartSelection::Aqi => "AQI".to_string(),
        ChartSelection::Pollutant(p) => p.as_str().to_string(),
        ChartSelection::AllPollutants => "Pollutants".to_string(),
    };
    let title = format!(
        "{} over time at {}",
        label,
        site_name(&table, site).unwrap_or("unknown site")
    );

    let data: DataFrame = table
        .to_dataframe()?
        .lazy()
        .filter_site(site)
        .sort_by_time()
        .collect()?;

    let (y, rest) = match series.split_first() {
        Some((first, rest)) => (*first, rest.to_vec()),
        None => ("aqi", Vec::new()),
    };

    TimeSeriesPlot::builder()
        .data(&data)
        .x("datacreationdate")
        .y(y)
        .additional_series(rest)
        .plot_title(Text::from(title.as_str()).size(18))
        .x_title("Date Time")
        .y_title("Level")
        .build()
        .plot();
    Ok(())
}
