//! Weather Acquisition
//!
//! The advisory core only needs a [`WeatherProfile`]. Where it comes from is a
//! collaborator concern behind [`WeatherSource`]; a failed fetch is replaced by
//! the default climatology so a recommendation is always produced.

use crate::error::{DegradedInput, SourceError};
use crate::profiles::WeatherProfile;
use serde_json::Value;
use tracing::{debug, warn};

/// POWER reports corrected precipitation in mm/day; scaled to a yearly figure
const PRECIPITATION_YEAR_FACTOR: f64 = 3650.0;

const FALLBACK_TEMPERATURE_C: f64 = 25.0;
const FALLBACK_HUMIDITY: f64 = 60.0;
const FALLBACK_RAINFALL_MM: f64 = 1000.0;
const FALLBACK_SOLAR_RADIATION: f64 = 5.0;

/// Supplies current weather for a coordinate
pub trait WeatherSource {
    fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherProfile, SourceError>;
}

/// A source that always returns the same profile
#[derive(Debug, Clone)]
pub struct FixedWeather(pub WeatherProfile);

impl WeatherSource for FixedWeather {
    fn fetch(&self, _latitude: f64, _longitude: f64) -> Result<WeatherProfile, SourceError> {
        Ok(self.0.clone())
    }
}

/// Fetch weather, substituting the default climatology on failure
pub fn resolve_weather<S: WeatherSource + ?Sized>(
    source: &S,
    latitude: f64,
    longitude: f64,
) -> WeatherProfile {
    match source.fetch(latitude, longitude) {
        Ok(profile) => {
            debug!(latitude, longitude, rainfall_mm = profile.rainfall_mm, "weather fetched");
            profile
        }
        Err(err) => {
            warn!(
                latitude,
                longitude,
                kind = %DegradedInput::MissingSource,
                error = %err,
                "weather unavailable, using default climatology"
            );
            WeatherProfile::default_climatology()
        }
    }
}

/// Convert a NASA POWER climatology payload into a profile
///
/// Reads the annual (`ANN`) value of each parameter under
/// `properties.parameter`, rounding half to even. An absent parameter or a
/// non-numeric `ANN` makes the payload unusable. A parameter that is present
/// but null, empty or rounds to zero takes its fallback value.
pub fn parse_power_climatology(payload: &Value) -> Result<WeatherProfile, SourceError> {
    let parameters = payload
        .get("properties")
        .and_then(|p| p.get("parameter"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            SourceError::Unavailable("climatology payload has no properties.parameter".to_string())
        })?;

    let annual = |name: &str, scale: f64, fallback: f64| -> Result<f64, SourceError> {
        let parameter = parameters.get(name).ok_or_else(|| {
            SourceError::Unavailable(format!("climatology payload has no {} parameter", name))
        })?;

        if is_blank(parameter) {
            debug!(parameter = name, fallback, "blank climatology parameter");
            return Ok(fallback);
        }

        let value = parameter.get("ANN").and_then(Value::as_f64).ok_or_else(|| {
            SourceError::Unavailable(format!("{} has no numeric ANN value", name))
        })?;

        let rounded = (value * scale).round_ties_even();
        Ok(if rounded == 0.0 { fallback } else { rounded })
    };

    Ok(WeatherProfile {
        rainfall_mm: annual("PRECTOTCORR", PRECIPITATION_YEAR_FACTOR, FALLBACK_RAINFALL_MM)?,
        temperature_c: annual("T2M", 1.0, FALLBACK_TEMPERATURE_C)?,
        humidity: annual("RH2M", 1.0, FALLBACK_HUMIDITY)?,
        solar_radiation: annual("ALLSKY_SFC_SW_DWN", 1.0, FALLBACK_SOLAR_RADIATION)?,
    })
}

/// Null, empty object or empty array
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Offline;

    impl WeatherSource for Offline {
        fn fetch(&self, _latitude: f64, _longitude: f64) -> Result<WeatherProfile, SourceError> {
            Err(SourceError::Unavailable("no network".to_string()))
        }
    }

    #[test]
    fn test_resolve_falls_back_to_default_climatology() {
        let weather = resolve_weather(&Offline, 15.85, 74.5);
        assert_eq!(weather, WeatherProfile::default_climatology());
    }

    #[test]
    fn test_resolve_passes_through_fetched_profile() {
        let profile = WeatherProfile {
            rainfall_mm: 850.0,
            temperature_c: 28.0,
            humidity: 65.0,
            solar_radiation: 5.5,
        };
        let weather = resolve_weather(&FixedWeather(profile.clone()), 15.85, 74.5);
        assert_eq!(weather, profile);
    }

    #[test]
    fn test_parse_power_climatology() {
        let payload = json!({
            "properties": { "parameter": {
                "T2M": { "ANN": 24.6 },
                "RH2M": { "ANN": 71.3 },
                "PRECTOTCORR": { "ANN": 0.3 },
                "ALLSKY_SFC_SW_DWN": { "ANN": 5.4 }
            }}
        });

        let weather = parse_power_climatology(&payload).unwrap();
        assert_eq!(weather.temperature_c, 25.0);
        assert_eq!(weather.humidity, 71.0);
        assert_eq!(weather.rainfall_mm, 1095.0);
        assert_eq!(weather.solar_radiation, 5.0);
    }

    #[test]
    fn test_parse_power_rounds_half_to_even() {
        let payload = json!({
            "properties": { "parameter": {
                "T2M": { "ANN": 24.5 },
                "RH2M": { "ANN": 70.5 },
                "PRECTOTCORR": { "ANN": 0.3 },
                "ALLSKY_SFC_SW_DWN": { "ANN": 5.5 }
            }}
        });

        let weather = parse_power_climatology(&payload).unwrap();
        assert_eq!(weather.temperature_c, 24.0);
        assert_eq!(weather.humidity, 70.0);
        assert_eq!(weather.solar_radiation, 6.0);
    }

    #[test]
    fn test_parse_power_absent_parameter_is_unavailable() {
        let payload = json!({
            "properties": { "parameter": {
                "RH2M": { "ANN": 70.0 },
                "PRECTOTCORR": { "ANN": 0.3 },
                "ALLSKY_SFC_SW_DWN": { "ANN": 5.4 }
            }}
        });

        let err = parse_power_climatology(&payload).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }

    #[test]
    fn test_partial_payload_resolves_to_default_climatology() {
        struct PartialPower;

        impl WeatherSource for PartialPower {
            fn fetch(&self, _latitude: f64, _longitude: f64) -> Result<WeatherProfile, SourceError> {
                parse_power_climatology(&json!({
                    "properties": { "parameter": { "RH2M": { "ANN": 70.0 } } }
                }))
            }
        }

        let weather = resolve_weather(&PartialPower, 15.85, 74.5);
        assert_eq!(weather, WeatherProfile::default_climatology());
    }

    #[test]
    fn test_parse_power_blank_or_zero_values_use_fallbacks() {
        let payload = json!({
            "properties": { "parameter": {
                "T2M": null,
                "RH2M": {},
                "PRECTOTCORR": { "ANN": 0.0 },
                "ALLSKY_SFC_SW_DWN": { "ANN": 0.2 }
            }}
        });

        let weather = parse_power_climatology(&payload).unwrap();
        assert_eq!(weather.temperature_c, 25.0);
        assert_eq!(weather.humidity, 60.0);
        assert_eq!(weather.rainfall_mm, 1000.0);
        assert_eq!(weather.solar_radiation, 5.0);
    }

    #[test]
    fn test_parse_power_non_numeric_annual_value() {
        let payload = json!({
            "properties": { "parameter": {
                "T2M": { "JAN": 22.0 },
                "RH2M": { "ANN": 70.0 },
                "PRECTOTCORR": { "ANN": 0.3 },
                "ALLSKY_SFC_SW_DWN": { "ANN": 5.4 }
            }}
        });

        assert!(parse_power_climatology(&payload).is_err());
    }

    #[test]
    fn test_parse_power_without_parameter_block() {
        let err = parse_power_climatology(&json!({ "messages": [] })).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
