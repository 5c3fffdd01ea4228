//! Utility modules shared by the feature pipeline and the scorer
//!
//! - Normalization: canonical crop names across source tables
//! - Calibration: tunable scoring weights and penalties
//! - LazyFrame helpers: typed column access with validation

pub mod normalization;
pub mod calibration;
pub mod lazy_helpers;

// Re-export commonly used types
pub use normalization::{standardize_crop_name, feature_key_fragment, CROP_ALIASES};
pub use calibration::{Calibration, SoilWeights, WeatherWeights};
pub use lazy_helpers::{materialize_with_columns, numeric_values, column_mean, parse_numeric};
