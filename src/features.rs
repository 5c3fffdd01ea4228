//! Historical Feature Extraction
//!
//! Summarizes each historical source into typed features:
//!
//! | Source      | Features                                                     |
//! |-------------|--------------------------------------------------------------|
//! | area        | mean area per crop                                           |
//! | yield       | mean yield per crop                                          |
//! | production  | mean production per crop                                     |
//! | price       | mean min/max/modal price of the 10 priciest commodities      |
//! | climatology | mean rainfall, temperature, humidity, radiation             |
//! | damage      | mean lives, cattle, houses lost and cropped area affected    |
//! | (merged)    | per-crop `yield_per_area` / `yield_efficiency`               |
//!
//! An absent source contributes nothing; extraction never fails.

use crate::data::{require_column, HistoricalSource, HistoricalTables};
use crate::error::DegradedInput;
use crate::long_form::{to_long_form, LongForm, Measure, YEAR_COLUMN};
use crate::merge::{merge_crop_tables, DerivedCropMetric, DerivedFeatures};
use crate::utils::lazy_helpers::{column_mean, column_names, mean, numeric_values, string_values};
use crate::utils::normalization::feature_key_fragment;
use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

pub const COMMODITY_COLUMN: &str = "Commodity";
pub const MIN_PRICE_COLUMN: &str = "Min_x0020_Price";
pub const MAX_PRICE_COLUMN: &str = "Max_x0020_Price";
pub const MODAL_PRICE_COLUMN: &str = "Modal_x0020_Price";

/// Commodities kept from the price table
pub const TOP_COMMODITIES: usize = 10;

/// Climatology parameters (NASA POWER names)
pub const RAINFALL_PARAM: &str = "PRECTOTCORR";
pub const TEMPERATURE_PARAM: &str = "T2M";
pub const HUMIDITY_PARAM: &str = "RH2M";
pub const RADIATION_PARAM: &str = "ALLSKY_SFC_SW_DWN";

pub const LIVES_LOST_COLUMN: &str = "Lives Lost (in Nos.)";
pub const CATTLE_LOST_COLUMN: &str = "Cattle Lost (in Nos.)";
pub const HOUSES_DAMAGED_COLUMN: &str = "House damaged (in Nos.)";
pub const CROPPED_AREA_COLUMN: &str = "Cropped areas affected (in lakh ha)";

/// Mean of each measure for one crop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropAverages {
    pub area: Option<f64>,
    #[serde(rename = "yield")]
    pub yield_: Option<f64>,
    pub production: Option<f64>,
}

impl CropAverages {
    fn set(&mut self, measure: Measure, value: f64) {
        match measure {
            Measure::Area => self.area = Some(value),
            Measure::Yield => self.yield_ = Some(value),
            Measure::Production => self.production = Some(value),
        }
    }

    fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Area => self.area,
            Measure::Yield => self.yield_,
            Measure::Production => self.production,
        }
    }
}

/// Mean market prices for one commodity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityPrice {
    pub commodity: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub modal_price: f64,
}

/// Long-term climate means from the climatology table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClimateNormals {
    pub rainfall: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub solar_radiation: Option<f64>,
}

impl ClimateNormals {
    pub fn is_empty(&self) -> bool {
        self.rainfall.is_none()
            && self.temperature.is_none()
            && self.humidity.is_none()
            && self.solar_radiation.is_none()
    }
}

/// Mean yearly disaster impact
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisasterImpact {
    pub lives_lost: Option<f64>,
    pub cattle_lost: Option<f64>,
    pub houses_damaged: Option<f64>,
    pub cropped_area_affected: Option<f64>,
}

/// All features extracted from the historical tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalFeatures {
    pub crop_averages: BTreeMap<String, CropAverages>,
    pub commodity_prices: Vec<CommodityPrice>,
    pub climate: ClimateNormals,
    pub disaster: Option<DisasterImpact>,
    pub derived: DerivedFeatures,
}

impl HistoricalFeatures {
    /// Extract every feature group from the loaded tables
    pub fn extract(tables: &HistoricalTables) -> Self {
        info!("extracting features from historical datasets");

        let area = long_form_of(tables, HistoricalSource::Area, Measure::Area);
        let yield_ = long_form_of(tables, HistoricalSource::Yield, Measure::Yield);
        let production = long_form_of(tables, HistoricalSource::Production, Measure::Production);

        let crop_averages = crop_averages(&[area.as_ref(), yield_.as_ref(), production.as_ref()]);
        let commodity_prices = tables.price.as_ref()
            .map(commodity_prices)
            .unwrap_or_default();
        let climate = tables.climatology.as_ref()
            .map(climate_normals)
            .unwrap_or_default();
        let disaster = tables.damage.as_ref().and_then(disaster_impact);
        let derived = merge_crop_tables(area.as_ref(), yield_.as_ref(), production.as_ref());

        let features = Self {
            crop_averages,
            commodity_prices,
            climate,
            disaster,
            derived,
        };
        info!(features = features.feature_count(), "extracted historical features");
        features
    }

    /// Derived metric for a crop, zero-valued when unavailable
    pub fn derived_or_zero(&self, crop: &str) -> DerivedCropMetric {
        self.derived.metric_or_zero(crop)
    }

    pub fn feature_count(&self) -> usize {
        self.to_feature_map().len()
    }

    /// Flatten into `name → value` using the historical key scheme
    pub fn to_feature_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();

        for (crop, averages) in &self.crop_averages {
            let key = feature_key_fragment(crop);
            for measure in [Measure::Area, Measure::Yield, Measure::Production] {
                if let Some(value) = averages.get(measure) {
                    map.insert(format!("{}_{}", measure.feature_prefix(), key), value);
                }
            }
        }

        for price in &self.commodity_prices {
            let key = feature_key_fragment(&price.commodity);
            if let Some(min) = price.min_price {
                map.insert(format!("avg_min_price_{}", key), min);
            }
            if let Some(max) = price.max_price {
                map.insert(format!("avg_max_price_{}", key), max);
            }
            map.insert(format!("avg_modal_price_{}", key), price.modal_price);
        }

        let climate = [
            (RAINFALL_PARAM, self.climate.rainfall),
            (TEMPERATURE_PARAM, self.climate.temperature),
            (HUMIDITY_PARAM, self.climate.humidity),
            (RADIATION_PARAM, self.climate.solar_radiation),
        ];
        for (param, value) in climate {
            if let Some(value) = value {
                map.insert(format!("avg_{}", param.to_lowercase()), value);
            }
        }

        if let Some(disaster) = &self.disaster {
            let impact = [
                ("avg_lives_lost", disaster.lives_lost),
                ("avg_cattle_lost", disaster.cattle_lost),
                ("avg_houses_damaged", disaster.houses_damaged),
                ("avg_cropped_area_affected", disaster.cropped_area_affected),
            ];
            for (name, value) in impact {
                if let Some(value) = value {
                    map.insert(name.to_string(), value);
                }
            }
        }

        for (crop, metric) in &self.derived.metrics {
            let key = feature_key_fragment(crop);
            map.insert(format!("yield_per_area_{}", key), metric.yield_per_area);
            map.insert(format!("yield_efficiency_{}", key), metric.yield_efficiency);
        }

        map
    }

    /// Write the flat feature map as a one-row CSV
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let map = self.to_feature_map();
        let columns: Vec<Column> = map.iter()
            .map(|(name, value)| Column::new(name.as_str().into(), [*value]))
            .collect();

        let mut df = DataFrame::new(columns)
            .with_context(|| "Failed to build feature frame")?;

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create feature file: {:?}", path))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("Failed to write feature file: {:?}", path))?;

        info!(path = %path.display(), features = map.len(), "saved historical features");
        Ok(())
    }
}

fn long_form_of(tables: &HistoricalTables, source: HistoricalSource, measure: Measure) -> Option<LongForm> {
    match tables.get(source) {
        Some(df) => to_long_form(df, measure),
        None => {
            debug!(source = source.key(), kind = %DegradedInput::MissingSource, "no table for long-form transform");
            None
        }
    }
}

/// Mean of each measure per crop across all years with a numeric value
pub fn crop_averages(tables: &[Option<&LongForm>]) -> BTreeMap<String, CropAverages> {
    let mut averages: BTreeMap<String, CropAverages> = BTreeMap::new();

    for long in tables.iter().flatten() {
        let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in &long.records {
            values.entry(record.crop.as_str()).or_default().push(record.value);
        }

        for (crop, values) in values {
            if let Some(avg) = mean(&values) {
                averages.entry(crop.to_string()).or_default().set(long.measure, avg);
            }
        }
    }

    averages
}

/// Mean prices per commodity, the `TOP_COMMODITIES` highest modal prices first
pub fn commodity_prices(price: &DataFrame) -> Vec<CommodityPrice> {
    match try_commodity_prices(price) {
        Ok(prices) => prices,
        Err(err) => {
            warn!(
                kind = %DegradedInput::MissingSource,
                error = %format!("{:#}", err),
                "price table unusable, no price features"
            );
            Vec::new()
        }
    }
}

fn try_commodity_prices(price: &DataFrame) -> Result<Vec<CommodityPrice>> {
    require_column(price, HistoricalSource::Price.key(), COMMODITY_COLUMN)?;
    require_column(price, HistoricalSource::Price.key(), MODAL_PRICE_COLUMN)?;

    let commodities = string_values(price, COMMODITY_COLUMN)?;
    let modal = numeric_values(price, MODAL_PRICE_COLUMN)?;
    let names = column_names(price);
    let optional = |column: &str| -> Result<Vec<Option<f64>>> {
        if names.iter().any(|n| n == column) {
            numeric_values(price, column)
        } else {
            Ok(vec![None; price.height()])
        }
    };
    let min = optional(MIN_PRICE_COLUMN)?;
    let max = optional(MAX_PRICE_COLUMN)?;

    #[derive(Default)]
    struct Samples {
        min: Vec<f64>,
        max: Vec<f64>,
        modal: Vec<f64>,
    }

    let mut grouped: BTreeMap<String, Samples> = BTreeMap::new();
    for (i, commodity) in commodities.into_iter().enumerate() {
        let Some(commodity) = commodity.filter(|c| !c.is_empty()) else {
            continue;
        };
        let samples = grouped.entry(commodity).or_default();
        samples.min.extend(min[i]);
        samples.max.extend(max[i]);
        samples.modal.extend(modal[i]);
    }

    let mut prices: Vec<CommodityPrice> = grouped.into_iter()
        .filter_map(|(commodity, samples)| {
            Some(CommodityPrice {
                modal_price: mean(&samples.modal)?,
                min_price: mean(&samples.min),
                max_price: mean(&samples.max),
                commodity,
            })
        })
        .collect();

    // Stable: equal modal prices stay in commodity-name order
    prices.sort_by(|a, b| b.modal_price.total_cmp(&a.modal_price));
    prices.truncate(TOP_COMMODITIES);
    Ok(prices)
}

/// Column means of the climatology parameters that are present
pub fn climate_normals(climatology: &DataFrame) -> ClimateNormals {
    let names = column_names(climatology);
    let param_mean = |param: &str| -> Option<f64> {
        if !names.iter().any(|n| n == param) {
            return None;
        }
        column_mean(climatology, param).ok().flatten()
    };

    ClimateNormals {
        rainfall: param_mean(RAINFALL_PARAM),
        temperature: param_mean(TEMPERATURE_PARAM),
        humidity: param_mean(HUMIDITY_PARAM),
        solar_radiation: param_mean(RADIATION_PARAM),
    }
}

/// Mean disaster impact; requires a `Year` column
pub fn disaster_impact(damage: &DataFrame) -> Option<DisasterImpact> {
    let names = column_names(damage);
    if !names.iter().any(|n| n == YEAR_COLUMN) {
        debug!("damage table has no Year column, skipping");
        return None;
    }

    let column_avg = |column: &str| -> Option<f64> {
        if !names.iter().any(|n| n == column) {
            return None;
        }
        column_mean(damage, column).ok().flatten()
    };

    Some(DisasterImpact {
        lives_lost: column_avg(LIVES_LOST_COLUMN),
        cattle_lost: column_avg(CATTLE_LOST_COLUMN),
        houses_damaged: column_avg(HOUSES_DAMAGED_COLUMN),
        cropped_area_affected: column_avg(CROPPED_AREA_COLUMN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_tables() -> HistoricalTables {
        let area = df![
            "Year" => &["2001-02", "2002-03"],
            "Food grains (cereals) - Rice" => &["1000", "1200"],
            "Food grains(pulses) - Other Pulses" => &["NA", "300"],
        ].unwrap();
        let yield_ = df![
            "Year" => &["2001-02", "2002-03"],
            "Foodgrains(cereals) - Rice" => &["2.5", "2.0"],
            "Foodgrains(pulses) - Other pulses" => &["0.5", "0.6"],
        ].unwrap();
        let production = df![
            "Year" => &["2001-02", "2002-03"],
            "Food Grains (Cereals) - Rice (000 tonnes)" => &["2500", "2400"],
            "Food Grains (Pulses) - Other Pulses (000 tonnes)" => &["150", "180"],
        ].unwrap();

        HistoricalTables::from_frames(Some(area), Some(yield_), Some(production))
    }

    #[test]
    fn test_crop_averages_skip_missing_cells() {
        let features = HistoricalFeatures::extract(&sample_tables());
        let pulses = &features.crop_averages["Other Pulses"];

        assert_relative_eq!(pulses.area.unwrap(), 300.0);
        assert_relative_eq!(pulses.yield_.unwrap(), 0.55);
        assert_relative_eq!(features.crop_averages["Rice"].area.unwrap(), 1100.0);
    }

    #[test]
    fn test_derived_features_from_aliased_tables() {
        let features = HistoricalFeatures::extract(&sample_tables());

        // Rice: (2500/1000 + 2400/1200) / 2
        assert_relative_eq!(features.derived_or_zero("Rice").yield_per_area, 2.25);
        // Other Pulses only joins in 2002
        assert_relative_eq!(features.derived_or_zero("Other Pulses").yield_per_area, 0.6);
        assert_eq!(features.derived_or_zero("Jowar").yield_per_area, 0.0);
    }

    #[test]
    fn test_feature_map_keys() {
        let map = HistoricalFeatures::extract(&sample_tables()).to_feature_map();

        assert!(map.contains_key("avg_area_Rice"));
        assert!(map.contains_key("avg_production_Other_Pulses"));
        assert!(map.contains_key("yield_per_area_Rice"));
        assert!(map.contains_key("yield_efficiency_Other_Pulses"));
        assert!(!map.keys().any(|k| k.starts_with("avg_modal_price_")));
    }

    #[test]
    fn test_commodity_prices_top_by_modal() {
        let price = df![
            "Commodity" => &["Onion", "Onion", "Turmeric", "Maize"],
            "Min_x0020_Price" => &["800", "1000", "7000", "1500"],
            "Max_x0020_Price" => &["1200", "1400", "9000", "NA"],
            "Modal_x0020_Price" => &["1000", "1200", "8000", "1700"],
        ].unwrap();

        let prices = commodity_prices(&price);
        let names: Vec<&str> = prices.iter().map(|p| p.commodity.as_str()).collect();

        assert_eq!(names, vec!["Turmeric", "Maize", "Onion"]);
        assert_relative_eq!(prices[2].modal_price, 1100.0);
        assert_relative_eq!(prices[2].min_price.unwrap(), 900.0);
        assert_eq!(prices[1].max_price, None);
    }

    #[test]
    fn test_commodity_prices_truncated() {
        let commodities: Vec<String> = (0..15).map(|i| format!("C{:02}", i)).collect();
        let modal: Vec<String> = (0..15).map(|i| (i * 100).to_string()).collect();
        let price = df![
            "Commodity" => commodities,
            "Modal_x0020_Price" => modal,
        ].unwrap();

        let prices = commodity_prices(&price);
        assert_eq!(prices.len(), TOP_COMMODITIES);
        assert_eq!(prices[0].commodity, "C14");
    }

    #[test]
    fn test_price_table_without_commodity_column() {
        let price = df!["Modal_x0020_Price" => &["10"]].unwrap();
        assert!(commodity_prices(&price).is_empty());
    }

    #[test]
    fn test_climate_normals_partial() {
        let climatology = df![
            "T2M" => &["26.0", "28.0"],
            "RH2M" => &["60", "NA"],
        ].unwrap();

        let normals = climate_normals(&climatology);
        assert_relative_eq!(normals.temperature.unwrap(), 27.0);
        assert_relative_eq!(normals.humidity.unwrap(), 60.0);
        assert_eq!(normals.rainfall, None);
    }

    #[test]
    fn test_disaster_impact_requires_year() {
        let damage = df![
            "Year" => &["2001", "2002"],
            "Lives Lost (in Nos.)" => &["1000", "3000"],
        ].unwrap();
        let impact = disaster_impact(&damage).unwrap();
        assert_relative_eq!(impact.lives_lost.unwrap(), 2000.0);
        assert_eq!(impact.cattle_lost, None);

        let no_year = df!["Lives Lost (in Nos.)" => &["1"]].unwrap();
        assert!(disaster_impact(&no_year).is_none());
    }

    #[test]
    fn test_empty_tables_extract_nothing() {
        let features = HistoricalFeatures::extract(&HistoricalTables::default());
        assert!(features.to_feature_map().is_empty());
        assert!(features.derived.is_empty());
        assert!(features.climate.is_empty());
    }

    #[test]
    fn test_write_csv() {
        let path = std::env::temp_dir()
            .join(format!("agri_advisor_features_{}.csv", std::process::id()));
        let features = HistoricalFeatures::extract(&sample_tables());
        features.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let header = written.lines().next().unwrap();
        assert!(header.contains("yield_per_area_Rice"));
        assert_eq!(written.lines().count(), 2);

        std::fs::remove_file(&path).ok();
    }
}
