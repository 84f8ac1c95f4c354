//! demos/download_range.rs
//!
//! Downloads the latest available AQI window with a pollutant selection and saves it
//! as `<start>_to_<end>_aqi_data.csv`.
//!
//! AQI_API_KEY=... cargo run --example download_range -- pm2.5 so2

use aqi_merge::{export_file_name, format_timestamp, AqiClient, AqiError, Pollutant};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), AqiError> {
    let pollutants: Vec<Pollutant> = std::env::args()
        .skip(1)
        .filter_map(|arg| Pollutant::from_name(&arg))
        .collect();

    let client = AqiClient::from_env()?;
    let range = client.available_range().await?;
    let (Some(start), Some(end)) = (range.start_candidates().first().copied(), range.latest())
    else {
        println!("Not enough data to choose a range.");
        return Ok(());
    };
    println!(
        "Loading data from {} to {}...",
        format_timestamp(&start),
        format_timestamp(&end)
    );

    let extract = client.fetch_range(start, end, &pollutants).await?;
    let path = PathBuf::from(export_file_name(start, end));
    extract.write_csv(&path).await?;
    println!("Saved {} records to {}", extract.len(), path.display());
    Ok(())
}
