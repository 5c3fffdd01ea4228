//! Feature Merger
//!
//! Joins the long-form Area, Yield and Production tables on `(Crop, Year)` and
//! derives per-crop ratios:
//!
//! - `yield_per_area = Production / Area`
//! - `yield_efficiency = Yield / Area`
//!
//! The join is inner: a crop-year missing from any of the three tables cannot
//! support a ratio and is dropped. Rows with `Area <= 0` are removed before the
//! ratios are computed. Each ratio is then averaged over the remaining years of
//! a crop.
//!
//! The merger never fails. An absent or empty input table, or any error inside
//! the polars pipeline, yields empty [`DerivedFeatures`]; downstream consumers
//! read missing metrics as zero.

use crate::error::DegradedInput;
use crate::long_form::{LongForm, Measure, CROP_COLUMN, YEAR_COLUMN};
use crate::utils::lazy_helpers::{materialize_with_columns, numeric_values, string_values, year_values};
use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const YIELD_PER_AREA: &str = "yield_per_area";
const YIELD_EFFICIENCY: &str = "yield_efficiency";
const YEARS_COLUMN: &str = "years";

/// One joined crop-year with all three measures present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropObservation {
    pub crop: String,
    pub year: i32,
    pub area: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
    pub production: f64,
}

/// Ratios averaged across the years of one crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedCropMetric {
    pub crop: String,
    pub yield_per_area: f64,
    pub yield_efficiency: f64,
    /// Years contributing to the averages
    pub years: usize,
}

impl DerivedCropMetric {
    fn zero(crop: &str) -> Self {
        Self {
            crop: crop.to_string(),
            yield_per_area: 0.0,
            yield_efficiency: 0.0,
            years: 0,
        }
    }
}

/// Output of the merger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedFeatures {
    /// Joined crop-years with positive area, sorted by crop then year
    pub observations: Vec<CropObservation>,
    /// Per-crop averaged ratios
    pub metrics: BTreeMap<String, DerivedCropMetric>,
}

impl DerivedFeatures {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn get(&self, crop: &str) -> Option<&DerivedCropMetric> {
        self.metrics.get(crop)
    }

    /// Metric for a crop, zero-valued when the crop has none
    pub fn metric_or_zero(&self, crop: &str) -> DerivedCropMetric {
        self.metrics.get(crop)
            .cloned()
            .unwrap_or_else(|| DerivedCropMetric::zero(crop))
    }
}

/// Merge the three long-form tables and derive per-crop ratios
pub fn merge_crop_tables(
    area: Option<&LongForm>,
    yield_: Option<&LongForm>,
    production: Option<&LongForm>,
) -> DerivedFeatures {
    let (Some(area), Some(yield_), Some(production)) = (area, yield_, production) else {
        warn!(
            kind = %DegradedInput::MissingSource,
            "insufficient data for derived features (area, yield and production all required)"
        );
        return DerivedFeatures::default();
    };

    if area.is_empty() || yield_.is_empty() || production.is_empty() {
        warn!(
            kind = %DegradedInput::MissingSource,
            area_rows = area.len(),
            yield_rows = yield_.len(),
            production_rows = production.len(),
            "empty input table, no derived features"
        );
        return DerivedFeatures::default();
    }

    merge_frames(long_frames(area, yield_, production))
}

fn long_frames(area: &LongForm, yield_: &LongForm, production: &LongForm) -> Result<[LazyFrame; 3]> {
    Ok([
        area.to_frame().context("area frame")?.lazy(),
        yield_.to_frame().context("yield frame")?.lazy(),
        production.to_frame().context("production frame")?.lazy(),
    ])
}

/// Run the merge over long-form frames, recovering any pipeline error as empty output
fn merge_frames(frames: Result<[LazyFrame; 3]>) -> DerivedFeatures {
    match frames.and_then(|[area, yield_, production]| try_merge(area, yield_, production)) {
        Ok(features) => {
            info!(
                crops = features.metrics.len(),
                observations = features.observations.len(),
                "derived crop features"
            );
            features
        }
        Err(err) => {
            warn!(error = %format!("{:#}", err), "failed to derive crop features");
            DerivedFeatures::default()
        }
    }
}

fn try_merge(area_lf: LazyFrame, yield_lf: LazyFrame, production_lf: LazyFrame) -> Result<DerivedFeatures> {
    let keys = [col(CROP_COLUMN), col(YEAR_COLUMN)];
    let area_col = Measure::Area.column_name();
    let yield_col = Measure::Yield.column_name();
    let production_col = Measure::Production.column_name();

    let joined = area_lf
        .join(yield_lf, keys.clone(), keys.clone(), JoinArgs::new(JoinType::Inner))
        .join(production_lf, keys.clone(), keys, JoinArgs::new(JoinType::Inner));

    let positive = joined
        .filter(col(area_col).gt(lit(0.0)))
        .with_columns([
            (col(production_col) / col(area_col)).alias(YIELD_PER_AREA),
            (col(yield_col) / col(area_col)).alias(YIELD_EFFICIENCY),
        ])
        .sort([CROP_COLUMN, YEAR_COLUMN], SortMultipleOptions::default());

    let merged = materialize_with_columns(
        &positive,
        &[CROP_COLUMN, YEAR_COLUMN, area_col, yield_col, production_col, YIELD_PER_AREA, YIELD_EFFICIENCY],
        "merge",
    )?;

    debug!(rows = merged.height(), "joined area/yield/production rows with positive area");

    if merged.height() == 0 {
        warn!(
            kind = %DegradedInput::DivisionGuard,
            "no joined rows with positive area, no derived features"
        );
        return Ok(DerivedFeatures::default());
    }

    let observations = read_observations(&merged)?;

    let aggregated = merged
        .lazy()
        .group_by([col(CROP_COLUMN)])
        .agg([
            col(YIELD_PER_AREA).mean(),
            col(YIELD_EFFICIENCY).mean(),
            col(YIELD_PER_AREA).count().alias(YEARS_COLUMN),
        ])
        .sort([CROP_COLUMN], SortMultipleOptions::default())
        .collect()
        .context("aggregate derived metrics by crop")?;

    let crops = string_values(&aggregated, CROP_COLUMN)?;
    let per_area = numeric_values(&aggregated, YIELD_PER_AREA)?;
    let efficiency = numeric_values(&aggregated, YIELD_EFFICIENCY)?;
    let counts = numeric_values(&aggregated, YEARS_COLUMN)?;

    let mut metrics = BTreeMap::new();
    let rows = crops.into_iter().zip(per_area).zip(efficiency).zip(counts);
    for (((crop, per_area), efficiency), count) in rows {
        let (Some(crop), Some(yield_per_area), Some(yield_efficiency)) = (crop, per_area, efficiency) else {
            continue;
        };
        let years = count.unwrap_or(0.0) as usize;
        metrics.insert(crop.clone(), DerivedCropMetric {
            crop,
            yield_per_area,
            yield_efficiency,
            years,
        });
    }

    Ok(DerivedFeatures { observations, metrics })
}

fn read_observations(merged: &DataFrame) -> Result<Vec<CropObservation>> {
    let crops = string_values(merged, CROP_COLUMN)?;
    let years = year_values(merged, YEAR_COLUMN)?;
    let areas = numeric_values(merged, Measure::Area.column_name())?;
    let yields = numeric_values(merged, Measure::Yield.column_name())?;
    let productions = numeric_values(merged, Measure::Production.column_name())?;

    let observations = crops.into_iter()
        .zip(years)
        .zip(areas.into_iter().zip(yields).zip(productions))
        .filter_map(|((crop, year), ((area, yield_), production))| {
            Some(CropObservation {
                crop: crop?,
                year: year?,
                area: area?,
                yield_: yield_?,
                production: production?,
            })
        })
        .collect();

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::long_form::LongRecord;
    use approx::assert_relative_eq;

    fn long(measure: Measure, rows: &[(&str, i32, f64)]) -> LongForm {
        LongForm {
            measure,
            records: rows.iter()
                .map(|&(crop, year, value)| LongRecord { crop: crop.to_string(), year, value })
                .collect(),
            candidate_rows: rows.len(),
            dropped_rows: 0,
            duplicate_rows: 0,
        }
    }

    #[test]
    fn test_single_crop_ratios() {
        let area = long(Measure::Area, &[("Rice", 2001, 1000.0)]);
        let yield_ = long(Measure::Yield, &[("Rice", 2001, 2.5)]);
        let production = long(Measure::Production, &[("Rice", 2001, 2500.0)]);

        let features = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));
        let rice = features.get("Rice").unwrap();

        assert_relative_eq!(rice.yield_per_area, 2.5);
        assert_relative_eq!(rice.yield_efficiency, 0.0025);
        assert_eq!(rice.years, 1);
        assert_eq!(features.observations.len(), 1);
    }

    #[test]
    fn test_mean_across_years() {
        let area = long(Measure::Area, &[("Wheat", 2001, 100.0), ("Wheat", 2002, 200.0)]);
        let yield_ = long(Measure::Yield, &[("Wheat", 2001, 3.0), ("Wheat", 2002, 3.0)]);
        let production = long(Measure::Production, &[("Wheat", 2001, 300.0), ("Wheat", 2002, 800.0)]);

        let features = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));
        let wheat = features.get("Wheat").unwrap();

        // (3.0 + 4.0) / 2
        assert_relative_eq!(wheat.yield_per_area, 3.5);
        // (0.03 + 0.015) / 2
        assert_relative_eq!(wheat.yield_efficiency, 0.0225);
        assert_eq!(wheat.years, 2);
    }

    #[test]
    fn test_inner_join_drops_partial_years() {
        let area = long(Measure::Area, &[("Rice", 2001, 1000.0), ("Rice", 2002, 1000.0)]);
        let yield_ = long(Measure::Yield, &[("Rice", 2001, 2.0)]);
        let production = long(Measure::Production, &[("Rice", 2001, 2000.0), ("Rice", 2002, 9000.0)]);

        let features = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));

        assert_eq!(features.observations.len(), 1);
        assert_relative_eq!(features.get("Rice").unwrap().yield_per_area, 2.0);
    }

    #[test]
    fn test_non_positive_area_excluded() {
        let area = long(Measure::Area, &[("Gram", 2001, 0.0), ("Gram", 2002, 50.0), ("Tur", 2001, -1.0)]);
        let yield_ = long(Measure::Yield, &[("Gram", 2001, 1.0), ("Gram", 2002, 1.0), ("Tur", 2001, 1.0)]);
        let production = long(Measure::Production, &[("Gram", 2001, 10.0), ("Gram", 2002, 100.0), ("Tur", 2001, 5.0)]);

        let features = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));

        assert_relative_eq!(features.get("Gram").unwrap().yield_per_area, 2.0);
        assert!(features.get("Tur").is_none());
        assert!(features.metric_or_zero("Tur").yield_per_area == 0.0);
    }

    #[test]
    fn test_absent_or_empty_tables_give_empty_output() {
        let area = long(Measure::Area, &[("Rice", 2001, 1000.0)]);
        let yield_ = long(Measure::Yield, &[("Rice", 2001, 2.5)]);
        let empty = long(Measure::Production, &[]);

        assert!(merge_crop_tables(Some(&area), Some(&yield_), None).is_empty());
        assert!(merge_crop_tables(Some(&area), Some(&yield_), Some(&empty)).is_empty());
        assert!(merge_crop_tables(None, None, None).is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let area = long(Measure::Area, &[("Rice", 2001, 44900.0), ("Rice", 2002, 41176.0), ("Maize", 2001, 6582.0)]);
        let yield_ = long(Measure::Yield, &[("Rice", 2001, 2079.0), ("Rice", 2002, 1744.0), ("Maize", 2001, 2040.0)]);
        let production = long(Measure::Production, &[("Rice", 2001, 93340.0), ("Rice", 2002, 71820.0), ("Maize", 2001, 13160.0)]);

        let first = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));
        let second = merge_crop_tables(Some(&area), Some(&yield_), Some(&production));

        assert_eq!(first, second);
        assert_eq!(first.metrics.keys().collect::<Vec<_>>(), vec!["Maize", "Rice"]);
        assert_eq!(first.get("Rice").unwrap().years, 2);
        assert_eq!(first.get("Maize").unwrap().years, 1);
    }

    #[test]
    fn test_pipeline_error_gives_empty_output() {
        // Area frame without its measure column fails inside the lazy filter
        let area = df![
            YEAR_COLUMN => [2001i32],
            CROP_COLUMN => ["Rice"],
            "Hectares" => [1000.0],
        ].unwrap();
        let yield_ = long(Measure::Yield, &[("Rice", 2001, 2.5)]).to_frame().unwrap();
        let production = long(Measure::Production, &[("Rice", 2001, 2500.0)]).to_frame().unwrap();

        let features = merge_frames(Ok([area.lazy(), yield_.lazy(), production.lazy()]));

        assert!(features.is_empty());
        assert!(features.observations.is_empty());
        assert_eq!(features.metric_or_zero("Rice").years, 0);
    }

    #[test]
    fn test_frame_build_error_gives_empty_output() {
        let features = merge_frames(Err(anyhow::anyhow!("area frame")));
        assert!(features.is_empty());
    }
}
