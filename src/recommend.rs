//! Recommendation Composer
//!
//! Turns one plot's soil, weather and economic profile into a complete
//! [`Recommendation`]: main crop, intercrop, companion trees, field layout,
//! yield and profit estimates, and sustainability tips.
//!
//! The engine is a pure function of its inputs plus the static rule tables and
//! its [`Calibration`]. It holds no mutable state, so one engine can serve many
//! requests concurrently ([`RecommendationEngine::generate_batch`]).

use crate::error::DegradedInput;
use crate::profiles::{EconomicProfile, SoilProfile, WeatherProfile};
use crate::rules::{self, crop_rule, tree_rule, LayoutPattern, TREE_RULES};
use crate::scorer::{CropScore, SuitabilityScorer};
use crate::utils::calibration::Calibration;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SANDY_TEXTURE: &str = "Sandy";
const BOUNDARY_RAINFALL_MM: f64 = 600.0;
const MIXED_RAINFALL_MM: f64 = 1200.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Advice for one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub main_crop: String,
    pub intercrop: String,
    pub trees: Vec<String>,
    pub layout: LayoutPattern,
    pub expected_yield_kg: f64,
    pub profit_estimate_inr: f64,
    pub roi: f64,
    pub sustainability_tips: Vec<String>,
}

/// Inputs for one advisory request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub soil: SoilProfile,
    pub weather: WeatherProfile,
    pub economic: EconomicProfile,
    pub land_area_acres: f64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeProfile {
    pub name: String,
    pub spacing: String,
    pub maturity_years: u32,
    pub yield_per_tree_kg: f64,
}

/// Plot split by use, in acres
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandAllocation {
    pub main_crop_acres: f64,
    pub intercrop_acres: f64,
    pub tree_acres: f64,
}

impl LandAllocation {
    pub fn for_area(land_area_acres: f64) -> Self {
        Self {
            main_crop_acres: land_area_acres * rules::MAIN_CROP_AREA_RATIO,
            intercrop_acres: land_area_acres * rules::INTERCROP_AREA_RATIO,
            tree_acres: land_area_acres * rules::TREE_AREA_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicSummary {
    pub total_cost: f64,
    pub expected_income: f64,
    pub payback_period_months: f64,
}

impl EconomicSummary {
    pub fn new(recommendation: &Recommendation, budget_inr: f64) -> Self {
        let total_cost = cultivation_cost(budget_inr);
        let payback_period_months = if recommendation.roi > 0.0 {
            MONTHS_PER_YEAR / recommendation.roi
        } else {
            MONTHS_PER_YEAR
        };

        Self {
            total_cost,
            expected_income: recommendation.profit_estimate_inr + total_cost,
            payback_period_months,
        }
    }
}

/// Recommendation plus the views a presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryReport {
    pub location: String,
    pub land_area_acres: f64,
    pub recommendation: Recommendation,
    pub layout_description: String,
    pub layout_spacing: String,
    pub tree_details: Vec<TreeProfile>,
    pub land_allocation: LandAllocation,
    pub economic_summary: EconomicSummary,
    pub candidates: Vec<CropScore>,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    scorer: SuitabilityScorer,
}

impl RecommendationEngine {
    /// Engine with the reference calibration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calibration(calibration: Calibration) -> Self {
        Self {
            scorer: SuitabilityScorer::new(calibration),
        }
    }

    /// Compose a recommendation for one plot
    pub fn generate_recommendation(
        &self,
        soil: &SoilProfile,
        weather: &WeatherProfile,
        economic: &EconomicProfile,
        land_area_acres: f64,
        location: &str,
    ) -> Recommendation {
        let candidates = self.scorer.rank_crops(soil, weather);
        self.compose(&candidates, soil, weather, economic, land_area_acres, location)
    }

    fn compose(
        &self,
        candidates: &[CropScore],
        soil: &SoilProfile,
        weather: &WeatherProfile,
        economic: &EconomicProfile,
        land_area_acres: f64,
        location: &str,
    ) -> Recommendation {
        let (main_crop, intercrop) = select_crops(candidates);
        let trees = recommend_trees();
        let layout = determine_layout(soil, weather);
        let expected_yield_kg = estimate_yield(&main_crop, land_area_acres);
        let (profit_estimate_inr, roi) =
            estimate_profit(&main_crop, &intercrop, &trees, land_area_acres, economic.budget_inr);

        debug!(
            location,
            main_crop = main_crop.as_str(),
            intercrop = intercrop.as_str(),
            layout = layout.display_text(),
            roi,
            "composed recommendation"
        );

        Recommendation {
            main_crop,
            intercrop,
            trees,
            layout,
            expected_yield_kg,
            profit_estimate_inr,
            roi,
            sustainability_tips: sustainability_tips(soil, weather),
        }
    }

    /// Recommendation with layout, tree, land and economic detail
    pub fn generate_report(
        &self,
        soil: &SoilProfile,
        weather: &WeatherProfile,
        economic: &EconomicProfile,
        land_area_acres: f64,
        location: &str,
    ) -> AdvisoryReport {
        let candidates = self.scorer.rank_crops(soil, weather);
        let recommendation = self.compose(&candidates, soil, weather, economic, land_area_acres, location);

        let tree_details = recommendation.trees.iter()
            .filter_map(|name| tree_rule(name))
            .map(|tree| TreeProfile {
                name: tree.name.to_string(),
                spacing: tree.spacing.to_string(),
                maturity_years: tree.maturity_years,
                yield_per_tree_kg: tree.yield_per_tree_kg,
            })
            .collect();

        AdvisoryReport {
            location: location.to_string(),
            land_area_acres,
            layout_description: recommendation.layout.description().to_string(),
            layout_spacing: recommendation.layout.spacing().to_string(),
            tree_details,
            land_allocation: LandAllocation::for_area(land_area_acres),
            economic_summary: EconomicSummary::new(&recommendation, economic.budget_inr),
            candidates,
            recommendation,
        }
    }

    /// Recommendations for independent requests, in request order
    pub fn generate_batch(&self, requests: &[AdvisoryRequest]) -> Vec<Recommendation> {
        info!(requests = requests.len(), "generating recommendation batch");

        requests.par_iter()
            .map(|req| {
                self.generate_recommendation(
                    &req.soil,
                    &req.weather,
                    &req.economic,
                    req.land_area_acres,
                    &req.location,
                )
            })
            .collect()
    }
}

/// Main crop and an intercrop of a different category
///
/// Falls back to the default pair when nothing cleared the threshold, and to
/// the default intercrop when every other candidate shares the main category.
fn select_crops(candidates: &[CropScore]) -> (String, String) {
    let Some((main, rest)) = candidates.split_first() else {
        debug!("no crop cleared the threshold, using default pair");
        return (rules::FALLBACK_MAIN_CROP.to_string(), rules::FALLBACK_INTERCROP.to_string());
    };

    let main_category = crop_rule(&main.crop).map(|rule| rule.category);
    let intercrop = rest.iter()
        .find(|candidate| crop_rule(&candidate.crop).map(|rule| rule.category) != main_category)
        .map(|candidate| candidate.crop.clone())
        .unwrap_or_else(|| rules::FALLBACK_INTERCROP.to_string());

    (main.crop.clone(), intercrop)
}

/// Leading entries of the tree table; no soil or weather filtering
pub fn recommend_trees() -> Vec<String> {
    TREE_RULES.iter()
        .take(rules::TREES_PER_PLAN)
        .map(|tree| tree.name.to_string())
        .collect()
}

pub fn determine_layout(soil: &SoilProfile, weather: &WeatherProfile) -> LayoutPattern {
    if soil.texture == SANDY_TEXTURE && weather.rainfall_mm < BOUNDARY_RAINFALL_MM {
        LayoutPattern::BoundaryPlanting
    } else if weather.rainfall_mm > MIXED_RAINFALL_MM {
        LayoutPattern::MixedSystem
    } else {
        LayoutPattern::AlleyCropping
    }
}

/// Base yield × area; crops without a base yield use the default
pub fn estimate_yield(crop: &str, land_area_acres: f64) -> f64 {
    let base = rules::base_yield_kg_per_acre(crop).unwrap_or_else(|| {
        debug!(crop, kind = %DegradedInput::UnknownCrop, "no base yield, using default");
        rules::DEFAULT_BASE_YIELD_KG_PER_ACRE
    });
    base * land_area_acres
}

fn cultivation_cost(budget_inr: f64) -> f64 {
    budget_inr * rules::CULTIVATION_COST_SHARE
}

/// Profit and ROI for a plan
///
/// Income covers the main crop over the whole plot, the intercrop over its
/// share of the plot, and mango fruit when mango is among the trees. ROI is
/// 0 when the cost is 0.
pub fn estimate_profit(
    main_crop: &str,
    intercrop: &str,
    trees: &[String],
    land_area_acres: f64,
    budget_inr: f64,
) -> (f64, f64) {
    let main_yield = estimate_yield(main_crop, land_area_acres);
    let intercrop_yield = estimate_yield(intercrop, land_area_acres * rules::INTERCROP_AREA_SHARE);

    let tree_yield = if trees.iter().any(|tree| tree == rules::INCOME_TREE) {
        let tree_count = (land_area_acres * rules::INCOME_TREES_PER_ACRE).floor();
        let per_tree = tree_rule(rules::INCOME_TREE)
            .map(|tree| tree.yield_per_tree_kg)
            .unwrap_or(0.0);
        tree_count * per_tree
    } else {
        0.0
    };

    let main_price = rules::price_inr_per_kg(main_crop).unwrap_or(rules::DEFAULT_MAIN_CROP_PRICE);
    let intercrop_price = rules::price_inr_per_kg(intercrop).unwrap_or(rules::DEFAULT_INTERCROP_PRICE);
    let tree_price = rules::price_inr_per_kg(rules::INCOME_TREE).unwrap_or(rules::DEFAULT_TREE_PRICE);

    let income = main_yield * main_price + intercrop_yield * intercrop_price + tree_yield * tree_price;
    let cost = cultivation_cost(budget_inr);
    let profit = income - cost;

    let roi = if cost > 0.0 {
        profit / cost
    } else {
        debug!(kind = %DegradedInput::DivisionGuard, "zero cultivation cost, ROI set to 0");
        0.0
    };

    (profit, roi)
}

/// Baseline tips plus one tip per triggered soil or rainfall condition
pub fn sustainability_tips(soil: &SoilProfile, weather: &WeatherProfile) -> Vec<String> {
    let mut tips: Vec<String> = rules::BASELINE_TIPS.iter().map(|tip| tip.to_string()).collect();

    if soil.organic_carbon < rules::LOW_ORGANIC_CARBON_PCT {
        tips.push(rules::LOW_ORGANIC_CARBON_TIP.to_string());
    }

    if soil.ph < rules::ACIDIC_PH {
        tips.push(rules::ACIDIC_SOIL_TIP.to_string());
    } else if soil.ph > rules::ALKALINE_PH {
        tips.push(rules::ALKALINE_SOIL_TIP.to_string());
    }

    if weather.rainfall_mm < rules::LOW_RAINFALL_MM {
        tips.push(rules::LOW_RAINFALL_TIP.to_string());
    } else if weather.rainfall_mm > rules::HIGH_RAINFALL_MM {
        tips.push(rules::HIGH_RAINFALL_TIP.to_string());
    }

    tips
}
