//! Print an advisory report for the Belagavi reference plot
//!
//! Environment:
//! - `CALIBRATION_PATH`: optional JSON with scoring weight overrides

use agri_advisor_rust::{
    Calibration, EconomicProfile, RecommendationEngine, SoilProfile, WeatherProfile,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agri_advisor_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let calibration = match std::env::var("CALIBRATION_PATH") {
        Ok(path) => {
            tracing::info!("Loading calibration: {}", path);
            Calibration::load(Path::new(&path))?
        }
        Err(_) => Calibration::default(),
    };
    let engine = RecommendationEngine::with_calibration(calibration);

    let soil = SoilProfile {
        ph: 6.7,
        organic_carbon: 1.2,
        nitrogen: 150.0,
        phosphorus: 40.0,
        potassium: 200.0,
        texture: "Loam".to_string(),
        drainage: "Moderate".to_string(),
    };
    let weather = WeatherProfile {
        rainfall_mm: 850.0,
        temperature_c: 28.0,
        humidity: 65.0,
        solar_radiation: 5.5,
    };
    let economic = EconomicProfile {
        budget_inr: 60000.0,
        labor_availability: "Medium".to_string(),
        input_cost_type: "Organic".to_string(),
    };

    let report = engine.generate_report(&soil, &weather, &economic, 5.0, "Belagavi, Karnataka");
    tracing::info!(
        main_crop = report.recommendation.main_crop.as_str(),
        intercrop = report.recommendation.intercrop.as_str(),
        roi = report.recommendation.roi,
        "generated advisory report"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
