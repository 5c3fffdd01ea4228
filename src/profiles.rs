//! Advisory Input Profiles
//!
//! Point-in-time soil, weather and economic conditions for one plot. These are
//! request-scoped values supplied by the caller.

use serde::{Deserialize, Serialize};

/// Soil test results for the plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    /// Soil pH (H2O)
    pub ph: f64,

    /// Organic carbon (%)
    pub organic_carbon: f64,

    /// Available nitrogen (ppm)
    pub nitrogen: f64,

    /// Available phosphorus (ppm)
    pub phosphorus: f64,

    /// Available potassium (ppm)
    pub potassium: f64,

    /// Texture class label, e.g. "Loam", "Sandy Loam", "Clay Loam", "Sandy"
    pub texture: String,

    /// Drainage class label, e.g. "Moderate"
    pub drainage: String,
}

/// Annual climate summary for the plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    /// Annual rainfall (mm/year)
    pub rainfall_mm: f64,

    /// Mean temperature (°C)
    pub temperature_c: f64,

    /// Mean relative humidity (%)
    pub humidity: f64,

    /// All-sky surface shortwave radiation (kWh/m²/day)
    pub solar_radiation: f64,
}

impl WeatherProfile {
    /// Climatology substituted when live weather cannot be fetched
    pub fn default_climatology() -> Self {
        Self {
            rainfall_mm: 980.0,
            temperature_c: 28.0,
            humidity: 65.0,
            solar_radiation: 5.5,
        }
    }
}

/// Farmer's budget and input preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicProfile {
    /// Season budget (INR)
    pub budget_inr: f64,

    /// e.g. "Low", "Medium", "High"
    pub labor_availability: String,

    /// e.g. "Organic", "Conventional"
    pub input_cost_type: String,
}
