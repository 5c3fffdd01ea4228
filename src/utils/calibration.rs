//! Scoring Calibration
//!
//! Weights and penalties used by the suitability scorer. The defaults are the
//! reference constants; a JSON file can override any subset of them:
//!
//! ```json
//! { "soil": { "ph_weight": 0.4, "texture_weight": 0.2, "organic_carbon_weight": 0.4 },
//!   "candidate_threshold": 0.55 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Soil sub-score weights and penalties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilWeights {
    pub ph_weight: f64,
    pub texture_weight: f64,
    pub organic_carbon_weight: f64,
    /// Score for a pH outside the crop range
    pub ph_penalty: f64,
    /// Score for a texture the crop does not list
    pub texture_penalty: f64,
    /// Organic carbon % at which the carbon score saturates
    pub organic_carbon_optimum: f64,
}

impl Default for SoilWeights {
    fn default() -> Self {
        Self {
            ph_weight: 0.3,
            texture_weight: 0.3,
            organic_carbon_weight: 0.4,
            ph_penalty: 0.5,
            texture_penalty: 0.7,
            organic_carbon_optimum: 2.0,
        }
    }
}

/// Weather sub-score weights and penalties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherWeights {
    pub temperature_weight: f64,
    pub rainfall_weight: f64,
    /// Score for a temperature outside the crop range
    pub temperature_penalty: f64,
}

impl Default for WeatherWeights {
    fn default() -> Self {
        Self {
            temperature_weight: 0.6,
            rainfall_weight: 0.4,
            temperature_penalty: 0.5,
        }
    }
}

/// Complete calibration for crop suitability scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub soil: SoilWeights,
    pub weather: WeatherWeights,
    /// Candidates must score strictly above this
    pub candidate_threshold: f64,
    /// Maximum number of ranked candidates
    pub max_candidates: usize,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            soil: SoilWeights::default(),
            weather: WeatherWeights::default(),
            candidate_threshold: 0.5,
            max_candidates: 5,
        }
    }
}

impl Calibration {
    /// Load calibration overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read calibration file: {:?}", path))?;

        let calibration: Calibration = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse calibration JSON")?;

        calibration.validate()?;
        Ok(calibration)
    }

    /// Check that each weight group sums to 1 and penalties are scores
    pub fn validate(&self) -> Result<()> {
        let soil_sum =
            self.soil.ph_weight + self.soil.texture_weight + self.soil.organic_carbon_weight;
        if (soil_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            anyhow::bail!("Soil weights must sum to 1.0 (got {})", soil_sum);
        }

        let weather_sum = self.weather.temperature_weight + self.weather.rainfall_weight;
        if (weather_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            anyhow::bail!("Weather weights must sum to 1.0 (got {})", weather_sum);
        }

        for (name, penalty) in [
            ("soil.ph_penalty", self.soil.ph_penalty),
            ("soil.texture_penalty", self.soil.texture_penalty),
            ("weather.temperature_penalty", self.weather.temperature_penalty),
        ] {
            if !(0.0..=1.0).contains(&penalty) {
                anyhow::bail!("{} must be within [0, 1] (got {})", name, penalty);
            }
        }

        if self.soil.organic_carbon_optimum <= 0.0 {
            anyhow::bail!(
                "soil.organic_carbon_optimum must be positive (got {})",
                self.soil.organic_carbon_optimum
            );
        }

        if self.max_candidates == 0 {
            anyhow::bail!("max_candidates must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_matches_reference_constants() {
        let cal = Calibration::default();
        assert_relative_eq!(cal.soil.ph_weight, 0.3);
        assert_relative_eq!(cal.soil.texture_weight, 0.3);
        assert_relative_eq!(cal.soil.organic_carbon_weight, 0.4);
        assert_relative_eq!(cal.soil.texture_penalty, 0.7);
        assert_relative_eq!(cal.weather.temperature_weight, 0.6);
        assert_relative_eq!(cal.candidate_threshold, 0.5);
        assert_eq!(cal.max_candidates, 5);
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{ "candidate_threshold": 0.6, "weather": { "temperature_penalty": 0.25 } }"#;
        let cal: Calibration = serde_json::from_str(json).unwrap();

        assert_relative_eq!(cal.candidate_threshold, 0.6);
        assert_relative_eq!(cal.weather.temperature_penalty, 0.25);
        // Untouched fields keep their defaults
        assert_relative_eq!(cal.weather.rainfall_weight, 0.4);
        assert_eq!(cal.soil, SoilWeights::default());
    }

    #[test]
    fn test_validate_rejects_unbalanced_weights() {
        let mut cal = Calibration::default();
        cal.soil.ph_weight = 0.5;
        let err = cal.validate().unwrap_err().to_string();
        assert!(err.contains("Soil weights"));
    }

    #[test]
    fn test_validate_rejects_penalty_out_of_range() {
        let mut cal = Calibration::default();
        cal.soil.texture_penalty = 1.2;
        assert!(cal.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Calibration::load(Path::new("/nonexistent/calibration.json"));
        assert!(result.is_err());
    }
}
