//! Agroforestry Advisory Core
//!
//! Two pipelines share this crate:
//!
//! - Historical features: `data` loads the source tables, `long_form` reshapes
//!   them, `merge` joins area/yield/production into per-crop ratios and
//!   `features` summarizes everything into typed features.
//! - Recommendations: `scorer` rates each crop in the rule table against a
//!   plot's soil and weather, `recommend` composes the final advice.
//!
//! Static reference data lives in `rules`; tunable weights in
//! `utils::calibration`.

pub mod error;
pub mod utils;
pub mod rules;
pub mod profiles;
pub mod data;
pub mod long_form;
pub mod merge;
pub mod features;
pub mod weather;
pub mod scorer;
pub mod recommend;

// Re-export commonly used types
pub use error::{DegradedInput, SourceError};
pub use utils::{standardize_crop_name, Calibration};
pub use profiles::{EconomicProfile, SoilProfile, WeatherProfile};
pub use data::{HistoricalTables, SourceFiles};
pub use long_form::{to_long_form, LongForm, Measure};
pub use merge::{merge_crop_tables, DerivedCropMetric, DerivedFeatures};
pub use features::HistoricalFeatures;
pub use weather::{resolve_weather, WeatherSource};
pub use scorer::{CropScore, SuitabilityScorer};
pub use recommend::{AdvisoryReport, AdvisoryRequest, Recommendation, RecommendationEngine};
pub use rules::LayoutPattern;
