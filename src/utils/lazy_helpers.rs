//! Column access helpers with validation
//!
//! Historical tables arrive with every cell as text. These helpers pull typed
//! values out of a column with explicit coercion rules, and materialize lazy
//! pipelines with a check that every expected column survived.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Materialize LazyFrame with explicit column list and validation
///
/// # Errors
/// Returns error if materialization fails or any expected column is missing
/// from the result.
pub fn materialize_with_columns(
    lazy: &LazyFrame,
    columns: &[&str],
    context: &str,
) -> Result<DataFrame> {
    let col_exprs: Vec<Expr> = columns.iter()
        .map(|&name| col(name))
        .collect();

    let df = lazy
        .clone()
        .select(&col_exprs)
        .collect()
        .with_context(|| format!("{}: Failed to materialize columns {:?}", context, columns))?;

    let actual_cols: HashSet<String> = df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual_cols.contains(expected) {
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context, expected, actual_cols
            ));
        }
    }

    Ok(df)
}

/// Column names of a frame as owned strings, in frame order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parse one text cell as a number
///
/// Surrounding whitespace is ignored. Blank, "NA" and other non-numeric text,
/// as well as NaN, are missing.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

/// Coerce a column to numbers, one entry per row
///
/// Text columns are parsed cell by cell with [`parse_numeric`]; other dtypes
/// are cast to Float64.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?;

    if column.dtype() == &DataType::String {
        let values = column.str()
            .with_context(|| format!("Column '{}' is not string type", name))?;
        return Ok(values.into_iter()
            .map(|cell| cell.and_then(parse_numeric))
            .collect());
    }

    let casted = column.cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' cannot be cast to Float64", name))?;
    let values = casted.as_materialized_series().f64()?;

    Ok(values.into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Text values of a column, one entry per row (non-text dtypes are cast)
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?;

    let casted = column.cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be cast to String", name))?;
    let values = casted.as_materialized_series().str()?;

    Ok(values.into_iter()
        .map(|cell| cell.map(|s| s.trim().to_string()))
        .collect())
}

/// Leading integer of a year label ("2001-02" → 2001, "2005" → 2005)
pub fn parse_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    let digits: String = trimmed.chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Year keys of a column, one entry per row
pub fn year_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    Ok(string_values(df, name)?
        .into_iter()
        .map(|cell| cell.as_deref().and_then(parse_year))
        .collect())
}

/// Arithmetic mean of the numeric cells of a column (None if there are none)
pub fn column_mean(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    let values: Vec<f64> = numeric_values(df, name)?
        .into_iter()
        .flatten()
        .collect();
    Ok(mean(&values))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
