//! Static Reference Tables
//!
//! Crop suitability rules, tree profiles, base yields, market prices, layout
//! patterns and the baseline sustainability tips. All tables are `static` and
//! the keyed views are built once per process behind `LazyLock`; nothing here
//! is mutated at runtime.
//!
//! Units: pH (H2O), temperature °C, annual rainfall mm, yields kg/acre,
//! prices INR/kg.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Broad crop category, used to pick an intercrop of a different kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropCategory {
    Cereal,
    Pulse,
    Oilseed,
    Fiber,
    Fruit,
    Vegetable,
    Spice,
}

/// Soil and climate envelope for one crop (inclusive bounds)
#[derive(Debug, Clone, Serialize)]
pub struct CropRule {
    pub name: &'static str,
    pub ph_min: f64,
    pub ph_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rainfall_min: f64,
    pub rainfall_max: f64,
    pub soil_textures: &'static [&'static str],
    pub category: CropCategory,
}

impl CropRule {
    pub fn ph_in_range(&self, ph: f64) -> bool {
        self.ph_min <= ph && ph <= self.ph_max
    }

    pub fn temperature_in_range(&self, temperature_c: f64) -> bool {
        self.temp_min <= temperature_c && temperature_c <= self.temp_max
    }

    pub fn accepts_texture(&self, texture: &str) -> bool {
        self.soil_textures.contains(&texture)
    }
}

/// Reference rule table. Order is significant: ranking ties keep this order.
pub static CROP_RULES: &[CropRule] = &[
    CropRule {
        name: "Maize",
        ph_min: 5.5,
        ph_max: 7.5,
        temp_min: 15.0,
        temp_max: 35.0,
        rainfall_min: 500.0,
        rainfall_max: 1500.0,
        soil_textures: &["Loam", "Sandy Loam"],
        category: CropCategory::Cereal,
    },
    CropRule {
        name: "Cowpea",
        ph_min: 5.5,
        ph_max: 7.0,
        temp_min: 20.0,
        temp_max: 35.0,
        rainfall_min: 400.0,
        rainfall_max: 1200.0,
        soil_textures: &["Loam", "Sandy Loam", "Clay Loam"],
        category: CropCategory::Pulse,
    },
    CropRule {
        name: "Mango",
        ph_min: 5.5,
        ph_max: 7.5,
        temp_min: 20.0,
        temp_max: 40.0,
        rainfall_min: 600.0,
        rainfall_max: 2500.0,
        soil_textures: &["Loam", "Sandy Loam", "Clay Loam"],
        category: CropCategory::Fruit,
    },
    CropRule {
        name: "Gliricidia",
        ph_min: 5.0,
        ph_max: 8.0,
        temp_min: 15.0,
        temp_max: 35.0,
        rainfall_min: 500.0,
        rainfall_max: 2500.0,
        soil_textures: &["Loam", "Sandy Loam", "Clay Loam", "Sandy"],
        category: CropCategory::Fiber,
    },
    CropRule {
        name: "Turmeric",
        ph_min: 4.5,
        ph_max: 7.5,
        temp_min: 20.0,
        temp_max: 35.0,
        rainfall_min: 1000.0,
        rainfall_max: 2500.0,
        soil_textures: &["Loam", "Clay Loam"],
        category: CropCategory::Spice,
    },
    CropRule {
        name: "Sorghum",
        ph_min: 5.5,
        ph_max: 7.5,
        temp_min: 15.0,
        temp_max: 35.0,
        rainfall_min: 300.0,
        rainfall_max: 1000.0,
        soil_textures: &["Loam", "Sandy Loam", "Clay Loam", "Sandy"],
        category: CropCategory::Cereal,
    },
];

static CROP_RULE_INDEX: LazyLock<FxHashMap<&'static str, &'static CropRule>> =
    LazyLock::new(|| CROP_RULES.iter().map(|rule| (rule.name, rule)).collect());

/// Look up the rule for a crop by exact name
pub fn crop_rule(name: &str) -> Option<&'static CropRule> {
    CROP_RULE_INDEX.get(name).copied()
}

/// Agroforestry tree profile
#[derive(Debug, Clone, Serialize)]
pub struct TreeRule {
    pub name: &'static str,
    pub spacing: &'static str,
    pub maturity_years: u32,
    pub yield_per_tree_kg: f64,
}

/// Tree table, in recommendation order
pub static TREE_RULES: &[TreeRule] = &[
    TreeRule {
        name: "Mango",
        spacing: "10x10m",
        maturity_years: 4,
        yield_per_tree_kg: 200.0,
    },
    TreeRule {
        name: "Gliricidia",
        spacing: "2x2m",
        maturity_years: 2,
        yield_per_tree_kg: 15.0,
    },
];

pub fn tree_rule(name: &str) -> Option<&'static TreeRule> {
    TREE_RULES.iter().find(|tree| tree.name == name)
}

// ============================================================================
// Economics
// ============================================================================

/// Base yield per acre for crops with a modelled yield
pub static BASE_YIELDS_KG_PER_ACRE: &[(&str, f64)] = &[
    ("Maize", 4000.0),
    ("Sorghum", 3000.0),
    ("Cowpea", 1000.0),
    ("Turmeric", 2000.0),
];

pub const DEFAULT_BASE_YIELD_KG_PER_ACRE: f64 = 2500.0;

/// Farm-gate prices
pub static CROP_PRICES_INR_PER_KG: &[(&str, f64)] = &[
    ("Maize", 20.0),
    ("Sorghum", 25.0),
    ("Cowpea", 50.0),
    ("Turmeric", 100.0),
    ("Mango", 60.0),
];

pub const DEFAULT_MAIN_CROP_PRICE: f64 = 25.0;
pub const DEFAULT_INTERCROP_PRICE: f64 = 30.0;
pub const DEFAULT_TREE_PRICE: f64 = 60.0;

/// Only mango tree income is modelled
pub const INCOME_TREE: &str = "Mango";
pub const INCOME_TREES_PER_ACRE: f64 = 20.0;

/// Share of the budget spent on cultivation
pub const CULTIVATION_COST_SHARE: f64 = 0.6;

/// Share of the plot given to the intercrop when estimating its income
pub const INTERCROP_AREA_SHARE: f64 = 0.3;

pub const FALLBACK_MAIN_CROP: &str = "Maize";
pub const FALLBACK_INTERCROP: &str = "Cowpea";

/// Number of trees recommended per plot
pub const TREES_PER_PLAN: usize = 2;

static BASE_YIELD_INDEX: LazyLock<FxHashMap<&'static str, f64>> =
    LazyLock::new(|| BASE_YIELDS_KG_PER_ACRE.iter().copied().collect());

static PRICE_INDEX: LazyLock<FxHashMap<&'static str, f64>> =
    LazyLock::new(|| CROP_PRICES_INR_PER_KG.iter().copied().collect());

pub fn base_yield_kg_per_acre(crop: &str) -> Option<f64> {
    BASE_YIELD_INDEX.get(crop).copied()
}

pub fn price_inr_per_kg(crop: &str) -> Option<f64> {
    PRICE_INDEX.get(crop).copied()
}

// ============================================================================
// Layout
// ============================================================================

/// Field layout pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutPattern {
    #[serde(rename = "Alley Cropping")]
    AlleyCropping,
    #[serde(rename = "Boundary Planting")]
    BoundaryPlanting,
    #[serde(rename = "Mixed System")]
    MixedSystem,
}

impl LayoutPattern {
    pub fn display_text(&self) -> &'static str {
        match self {
            LayoutPattern::AlleyCropping => "Alley Cropping",
            LayoutPattern::BoundaryPlanting => "Boundary Planting",
            LayoutPattern::MixedSystem => "Mixed System",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayoutPattern::AlleyCropping => "Alternate rows of trees and crops",
            LayoutPattern::BoundaryPlanting => "Trees planted along field boundaries",
            LayoutPattern::MixedSystem => "Trees scattered throughout the field",
        }
    }

    pub fn spacing(&self) -> &'static str {
        match self {
            LayoutPattern::AlleyCropping => "5-10m between tree rows",
            LayoutPattern::BoundaryPlanting => "Along perimeter",
            LayoutPattern::MixedSystem => "Variable based on species",
        }
    }
}

/// Land split used by the layout view
pub const MAIN_CROP_AREA_RATIO: f64 = 0.6;
pub const INTERCROP_AREA_RATIO: f64 = 0.25;
pub const TREE_AREA_RATIO: f64 = 0.15;

// ============================================================================
// Sustainability
// ============================================================================

pub static BASELINE_TIPS: &[&str] = &[
    "Apply compost from residues and cow dung",
    "Use drip irrigation to optimize water",
    "Rotate crops every two seasons",
    "Plant nitrogen-fixing legumes to improve soil fertility",
    "Use organic mulch to retain moisture and suppress weeds",
    "Practice intercropping to maximize land use efficiency",
];

pub const LOW_ORGANIC_CARBON_TIP: &str = "Soil organic carbon is low. Increase compost application.";
pub const ACIDIC_SOIL_TIP: &str = "Soil is acidic. Consider liming to raise pH.";
pub const ALKALINE_SOIL_TIP: &str = "Soil is alkaline. Add organic matter to lower pH.";
pub const LOW_RAINFALL_TIP: &str =
    "Low rainfall area. Focus on drought-resistant crops and water conservation.";
pub const HIGH_RAINFALL_TIP: &str =
    "High rainfall area. Ensure proper drainage to prevent waterlogging.";

pub const LOW_ORGANIC_CARBON_PCT: f64 = 1.0;
pub const ACIDIC_PH: f64 = 5.5;
pub const ALKALINE_PH: f64 = 8.0;
pub const LOW_RAINFALL_MM: f64 = 500.0;
pub const HIGH_RAINFALL_MM: f64 = 1500.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_unique() {
        assert_eq!(CROP_RULE_INDEX.len(), CROP_RULES.len());
    }

    #[test]
    fn test_rule_bounds_ordered() {
        for rule in CROP_RULES {
            assert!(rule.ph_min <= rule.ph_max, "{}", rule.name);
            assert!(rule.temp_min <= rule.temp_max, "{}", rule.name);
            assert!(rule.rainfall_min > 0.0, "{}", rule.name);
            assert!(rule.rainfall_min <= rule.rainfall_max, "{}", rule.name);
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(crop_rule("Sorghum").map(|r| r.category), Some(CropCategory::Cereal));
        assert!(crop_rule("sorghum").is_none());
        assert_eq!(base_yield_kg_per_acre("Cowpea"), Some(1000.0));
        assert_eq!(base_yield_kg_per_acre("Mango"), None);
        assert_eq!(price_inr_per_kg("Mango"), Some(60.0));
        assert_eq!(tree_rule("Gliricidia").map(|t| t.maturity_years), Some(2));
    }

    #[test]
    fn test_inclusive_bounds() {
        let maize = crop_rule("Maize").unwrap();
        assert!(maize.ph_in_range(5.5));
        assert!(maize.ph_in_range(7.5));
        assert!(!maize.ph_in_range(7.51));
        assert!(maize.temperature_in_range(35.0));
        assert!(maize.accepts_texture("Sandy Loam"));
        assert!(!maize.accepts_texture("Clay"));
    }

    #[test]
    fn test_layout_area_ratios_cover_plot() {
        let total = MAIN_CROP_AREA_RATIO + INTERCROP_AREA_RATIO + TREE_AREA_RATIO;
        assert!((total - 1.0).abs() < 1e-12);
    }
}
