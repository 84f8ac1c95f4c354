//! demos/merge_files.rs
//!
//! Merges two or more downloaded AQI extracts into one CSV file.
//!
//! cargo run --example merge_files -- [--lenient] merged.csv first.csv second.csv [more.csv ...]
//!
//! With `--lenient`, non-numeric readings such as `-` are left empty instead of rejecting
//! the whole file.

use aqi_merge::{load_csv_file_with, NumericCellPolicy, TableMerger, BASE_COLUMNS};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let policy = match args.iter().position(|a| a == "--lenient") {
        Some(at) => {
            args.remove(at);
            NumericCellPolicy::LeaveEmpty
        }
        None => NumericCellPolicy::Reject,
    };
    let mut args = args.into_iter().map(PathBuf::from);
    let Some(output) = args.next() else {
        eprintln!("usage: merge_files [--lenient] <output.csv> <input.csv> <input.csv> [...]");
        std::process::exit(2);
    };
    let inputs: Vec<PathBuf> = args.collect();

    let required: Vec<&str> = BASE_COLUMNS.iter().map(|c| c.as_str()).collect();
    println!("Every file has to include the columns {:?}", required);

    let mut row_sets = Vec::with_capacity(inputs.len());
    for path in &inputs {
        match load_csv_file_with(path, policy).await {
            Ok(report) => {
                println!("{}: {} rows", path.display(), report.table.len());
                for cell in &report.skipped {
                    eprintln!(
                        "{}: left '{}' empty in column '{}', row {}",
                        path.display(),
                        cell.value,
                        cell.column,
                        cell.row
                    );
                }
                row_sets.push(report.table);
            }
            // Skip unusable files the way the interactive tool did, and keep going.
            Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
        }
    }

    let outcome = TableMerger::default().merge(&row_sets)?;
    for conflict in &outcome.conflicts {
        eprintln!("{}", conflict);
    }

    outcome.table.write_csv(&output).await?;
    println!(
        "Complete! {} records written to {}",
        outcome.table.len(),
        output.display()
    );
    Ok(())
}
