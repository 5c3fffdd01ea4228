//! Long-Form Transformer
//!
//! Reshapes a wide historical table (one `Year` column plus one column per crop)
//! into `(Year, Crop, Value)` records.
//!
//! Rules:
//! - Crop column names pass through [`standardize_crop_name`]
//! - Values are coerced to numbers; non-numeric cells drop the row (never zero)
//! - Year labels are keyed by their leading integer ("2001-02" → 2001); rows
//!   whose year has none are dropped
//! - After normalization a `(Crop, Year)` key is kept once (first occurrence)
//! - Records are grouped by crop column, then by year in table order

use crate::error::DegradedInput;
use crate::utils::lazy_helpers::{column_names, numeric_values, year_values};
use crate::utils::normalization::standardize_crop_name;
use anyhow::Result;
use polars::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

pub const YEAR_COLUMN: &str = "Year";
pub const CROP_COLUMN: &str = "Crop";

/// Which quantity a table measures; also the value column name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Area,
    Yield,
    Production,
}

impl Measure {
    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::Area => "Area",
            Measure::Yield => "Yield",
            Measure::Production => "Production",
        }
    }

    /// Prefix used for flat per-crop average features
    pub fn feature_prefix(&self) -> &'static str {
        match self {
            Measure::Area => "avg_area",
            Measure::Yield => "avg_yield",
            Measure::Production => "avg_production",
        }
    }
}

/// One long-form row
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub year: i32,
    pub crop: String,
    pub value: f64,
}

/// Long-form view of one wide table
#[derive(Debug, Clone)]
pub struct LongForm {
    pub measure: Measure,
    pub records: Vec<LongRecord>,
    /// rows × crop columns, before any dropping
    pub candidate_rows: usize,
    /// Cells dropped for a non-numeric value or unusable year
    pub dropped_rows: usize,
    /// Cells dropped because their normalized `(Crop, Year)` was already seen
    pub duplicate_rows: usize,
}

impl LongForm {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Polars frame with columns `Year` (i32), `Crop` (str), `<Measure>` (f64)
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        let crops: Vec<&str> = self.records.iter().map(|r| r.crop.as_str()).collect();
        let values: Vec<f64> = self.records.iter().map(|r| r.value).collect();

        df![
            YEAR_COLUMN => years,
            CROP_COLUMN => crops,
            self.measure.column_name() => values,
        ]
    }
}

/// Transform a wide table into long form
///
/// Returns `None` when the table has no `Year` column.
pub fn to_long_form(wide: &DataFrame, measure: Measure) -> Option<LongForm> {
    let columns = column_names(wide);
    if !columns.iter().any(|c| c == YEAR_COLUMN) {
        debug!(measure = measure.column_name(), "table has no Year column, skipping");
        return None;
    }

    match build_long_form(wide, &columns, measure) {
        Ok(long) => {
            debug!(
                measure = measure.column_name(),
                candidates = long.candidate_rows,
                kept = long.len(),
                dropped = long.dropped_rows,
                duplicates = long.duplicate_rows,
                "long-form transform complete"
            );
            Some(long)
        }
        Err(err) => {
            warn!(
                measure = measure.column_name(),
                kind = %DegradedInput::MalformedValue,
                error = %err,
                "long-form transform failed"
            );
            None
        }
    }
}

fn build_long_form(wide: &DataFrame, columns: &[String], measure: Measure) -> Result<LongForm> {
    let years = year_values(wide, YEAR_COLUMN)?;
    let crop_columns: Vec<&String> = columns.iter()
        .filter(|c| c.as_str() != YEAR_COLUMN)
        .collect();

    let mut records = Vec::with_capacity(wide.height() * crop_columns.len());
    let mut seen: FxHashSet<(String, i32)> = FxHashSet::default();
    let mut dropped_rows = 0;
    let mut duplicate_rows = 0;

    for column in &crop_columns {
        let crop = standardize_crop_name(column);
        let values = numeric_values(wide, column)?;

        for (year, value) in years.iter().zip(values) {
            let (Some(year), Some(value)) = (*year, value) else {
                dropped_rows += 1;
                continue;
            };

            if !seen.insert((crop.clone(), year)) {
                duplicate_rows += 1;
                continue;
            }

            records.push(LongRecord {
                year,
                crop: crop.clone(),
                value,
            });
        }
    }

    Ok(LongForm {
        measure,
        records,
        candidate_rows: wide.height() * crop_columns.len(),
        dropped_rows,
        duplicate_rows,
    })
}
