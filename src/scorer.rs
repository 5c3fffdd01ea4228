//! Suitability Scorer
//!
//! Scores how well each crop in the rule table fits a plot's soil and weather.
//!
//! Soil suitability (weights from [`SoilWeights`]):
//! - pH inside the crop range → 1.0, else `ph_penalty`
//! - texture accepted by the crop → 1.0, else `texture_penalty`
//! - organic carbon → `min(1, oc / organic_carbon_optimum)`
//!
//! Weather suitability (weights from [`WeatherWeights`]):
//! - temperature inside the crop range → 1.0, else `temperature_penalty`
//! - rainfall inside the range → 1.0; below → `rain / min`; above → `max / rain`
//!
//! The combined score is the mean of the two. All range checks are inclusive.

use crate::error::DegradedInput;
use crate::profiles::{SoilProfile, WeatherProfile};
use crate::rules::{crop_rule, CropRule, CROP_RULES};
use crate::utils::calibration::{Calibration, SoilWeights, WeatherWeights};
use serde::Serialize;
use tracing::debug;

/// Scored crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropScore {
    pub crop: String,
    pub soil: f64,
    pub weather: f64,
    pub score: f64,
}

/// Rule-based crop suitability scorer
#[derive(Debug, Clone, Default)]
pub struct SuitabilityScorer {
    calibration: Calibration,
}

impl SuitabilityScorer {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Soil suitability of `crop`, 0.0 for an unknown crop
    pub fn soil_suitability(&self, crop: &str, soil: &SoilProfile) -> f64 {
        match lookup(crop) {
            Some(rule) => soil_score(rule, soil, &self.calibration.soil),
            None => 0.0,
        }
    }

    /// Weather suitability of `crop`, 0.0 for an unknown crop
    pub fn weather_suitability(&self, crop: &str, weather: &WeatherProfile) -> f64 {
        match lookup(crop) {
            Some(rule) => weather_score(rule, weather, &self.calibration.weather),
            None => 0.0,
        }
    }

    /// Combined suitability in [0, 1]
    pub fn score(&self, crop: &str, soil: &SoilProfile, weather: &WeatherProfile) -> f64 {
        match lookup(crop) {
            Some(rule) => self.score_rule(rule, soil, weather).score,
            None => 0.0,
        }
    }

    fn score_rule(&self, rule: &CropRule, soil: &SoilProfile, weather: &WeatherProfile) -> CropScore {
        let soil_fit = soil_score(rule, soil, &self.calibration.soil);
        let weather_fit = weather_score(rule, weather, &self.calibration.weather);

        CropScore {
            crop: rule.name.to_string(),
            soil: soil_fit,
            weather: weather_fit,
            score: (soil_fit + weather_fit) / 2.0,
        }
    }

    /// Every crop in the rule table, in table order
    pub fn score_all(&self, soil: &SoilProfile, weather: &WeatherProfile) -> Vec<CropScore> {
        CROP_RULES.iter()
            .map(|rule| self.score_rule(rule, soil, weather))
            .collect()
    }

    /// Candidates above the threshold, best first, at most `max_candidates`
    ///
    /// Equal scores keep rule-table order. An empty result is valid.
    pub fn rank_crops(&self, soil: &SoilProfile, weather: &WeatherProfile) -> Vec<CropScore> {
        let mut scores = self.score_all(soil, weather);
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        let ranked: Vec<CropScore> = scores.into_iter()
            .filter(|s| s.score > self.calibration.candidate_threshold)
            .take(self.calibration.max_candidates)
            .collect();

        debug!(
            candidates = ranked.len(),
            top = ranked.first().map(|s| s.crop.as_str()).unwrap_or("-"),
            "ranked crops"
        );
        ranked
    }
}

fn lookup(crop: &str) -> Option<&'static CropRule> {
    let rule = crop_rule(crop);
    if rule.is_none() {
        debug!(crop, kind = %DegradedInput::UnknownCrop, "crop not in rule table, scoring 0");
    }
    rule
}

fn soil_score(rule: &CropRule, soil: &SoilProfile, weights: &SoilWeights) -> f64 {
    let ph = if rule.ph_in_range(soil.ph) { 1.0 } else { weights.ph_penalty };
    let texture = if rule.accepts_texture(&soil.texture) { 1.0 } else { weights.texture_penalty };
    let carbon = (soil.organic_carbon / weights.organic_carbon_optimum).clamp(0.0, 1.0);

    ph * weights.ph_weight + texture * weights.texture_weight + carbon * weights.organic_carbon_weight
}

fn weather_score(rule: &CropRule, weather: &WeatherProfile, weights: &WeatherWeights) -> f64 {
    let temperature = if rule.temperature_in_range(weather.temperature_c) {
        1.0
    } else {
        weights.temperature_penalty
    };

    temperature * weights.temperature_weight + rainfall_score(rule, weather.rainfall_mm) * weights.rainfall_weight
}

/// 1.0 inside the range, otherwise the ratio to the nearest bound
fn rainfall_score(rule: &CropRule, rainfall_mm: f64) -> f64 {
    let ratio = if rainfall_mm < rule.rainfall_min {
        rainfall_mm / rule.rainfall_min
    } else if rainfall_mm > rule.rainfall_max {
        rule.rainfall_max / rainfall_mm
    } else {
        1.0
    };
    ratio.clamp(0.0, 1.0)
}
