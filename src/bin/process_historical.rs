//! Extract historical features from the source CSVs and save them as one row
//!
//! Environment:
//! - `DATA_DIR`: directory holding the six source tables (default `data`)
//! - `OUTPUT_PATH`: feature CSV to write (default `historical_features.csv`)

use agri_advisor_rust::{HistoricalFeatures, HistoricalTables, SourceFiles};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agri_advisor_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    let output_path = PathBuf::from(
        std::env::var("OUTPUT_PATH").unwrap_or_else(|_| "historical_features.csv".to_string()),
    );

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", data_dir.display());
    tracing::info!("  OUTPUT_PATH: {}", output_path.display());

    let tables = HistoricalTables::load(&data_dir, &SourceFiles::default());
    let features = HistoricalFeatures::extract(&tables);

    tracing::info!("Summary:");
    tracing::info!("  Crops with averages: {}", features.crop_averages.len());
    tracing::info!("  Commodities priced: {}", features.commodity_prices.len());
    tracing::info!("  Crops with derived metrics: {}", features.derived.metrics.len());
    for (crop, metric) in &features.derived.metrics {
        tracing::info!(
            "  {:<14} yield/area {:>10.4}  efficiency {:>10.6}  ({} years)",
            crop,
            metric.yield_per_area,
            metric.yield_efficiency,
            metric.years
        );
    }

    features.write_csv(&output_path)?;
    Ok(())
}
