//! Historical Table Loading
//!
//! Loads the six historical source tables with Polars. Every column is read as
//! text; numeric coercion happens downstream under the long-form rules so that
//! "NA" and blank cells are dropped rather than failing the whole file.
//!
//! A missing or unreadable file is logged and recorded as an absent source. The
//! feature pipeline treats an absent source as an empty contribution.

use crate::error::{DegradedInput, SourceError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The six historical sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoricalSource {
    Area,
    Yield,
    Production,
    Price,
    Climatology,
    Damage,
}

impl HistoricalSource {
    pub const ALL: [HistoricalSource; 6] = [
        HistoricalSource::Area,
        HistoricalSource::Yield,
        HistoricalSource::Production,
        HistoricalSource::Price,
        HistoricalSource::Climatology,
        HistoricalSource::Damage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            HistoricalSource::Area => "area",
            HistoricalSource::Yield => "yield",
            HistoricalSource::Production => "production",
            HistoricalSource::Price => "price",
            HistoricalSource::Climatology => "nasa_power",
            HistoricalSource::Damage => "damage",
        }
    }
}

/// File names of the historical sources inside the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub area: String,
    #[serde(rename = "yield")]
    pub yield_: String,
    pub production: String,
    pub price: String,
    pub climatology: String,
    pub damage: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            area: "All India level Area Under Principal Crops from 2001-02 to 2015-16.csv".to_string(),
            yield_: "All India level Average Yield of Principal Crops from 2001-02 to 2015-16.csv".to_string(),
            production: "Production of principle crops.csv".to_string(),
            price: "price.csv".to_string(),
            climatology: "1. NASA POWER Data (Rainfall, Temperature, Humidity, Radiation).csv".to_string(),
            damage: "Year-wise Damage Caused Due To Floods, Cyclonic Storm, Landslides etc.csv".to_string(),
        }
    }
}

impl SourceFiles {
    pub fn file_name(&self, source: HistoricalSource) -> &str {
        match source {
            HistoricalSource::Area => &self.area,
            HistoricalSource::Yield => &self.yield_,
            HistoricalSource::Production => &self.production,
            HistoricalSource::Price => &self.price,
            HistoricalSource::Climatology => &self.climatology,
            HistoricalSource::Damage => &self.damage,
        }
    }
}

/// Historical tables for one processing run
///
/// Each field is `None` when the source was unavailable.
#[derive(Debug, Clone, Default)]
pub struct HistoricalTables {
    pub area: Option<DataFrame>,
    pub yield_: Option<DataFrame>,
    pub production: Option<DataFrame>,
    pub price: Option<DataFrame>,
    pub climatology: Option<DataFrame>,
    pub damage: Option<DataFrame>,
}

impl HistoricalTables {
    /// Load every source from `data_dir`
    pub fn load(data_dir: &Path, files: &SourceFiles) -> Self {
        info!(data_dir = %data_dir.display(), "loading historical datasets");

        let mut tables = HistoricalTables::default();
        for source in HistoricalSource::ALL {
            let path = data_dir.join(files.file_name(source));
            let table = match load_table(&path) {
                Ok(df) => {
                    info!(
                        source = source.key(),
                        rows = df.height(),
                        columns = df.width(),
                        "loaded historical table"
                    );
                    Some(df)
                }
                Err(err) => {
                    warn!(
                        source = source.key(),
                        kind = %DegradedInput::MissingSource,
                        error = %err,
                        "historical table unavailable"
                    );
                    None
                }
            };
            tables.set(source, table);
        }

        info!(available = tables.available_count(), "historical datasets loaded");
        tables
    }

    /// Build from in-memory frames
    pub fn from_frames(
        area: Option<DataFrame>,
        yield_: Option<DataFrame>,
        production: Option<DataFrame>,
    ) -> Self {
        Self {
            area,
            yield_,
            production,
            ..Default::default()
        }
    }

    pub fn get(&self, source: HistoricalSource) -> Option<&DataFrame> {
        match source {
            HistoricalSource::Area => self.area.as_ref(),
            HistoricalSource::Yield => self.yield_.as_ref(),
            HistoricalSource::Production => self.production.as_ref(),
            HistoricalSource::Price => self.price.as_ref(),
            HistoricalSource::Climatology => self.climatology.as_ref(),
            HistoricalSource::Damage => self.damage.as_ref(),
        }
    }

    pub fn set(&mut self, source: HistoricalSource, table: Option<DataFrame>) {
        let slot = match source {
            HistoricalSource::Area => &mut self.area,
            HistoricalSource::Yield => &mut self.yield_,
            HistoricalSource::Production => &mut self.production,
            HistoricalSource::Price => &mut self.price,
            HistoricalSource::Climatology => &mut self.climatology,
            HistoricalSource::Damage => &mut self.damage,
        };
        *slot = table;
    }

    /// Number of sources that loaded
    pub fn available_count(&self) -> usize {
        HistoricalSource::ALL.iter()
            .filter(|source| self.get(**source).is_some())
            .count()
    }
}

/// Read one CSV with every column as text
pub fn load_table(path: &Path) -> Result<DataFrame, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing(path.to_path_buf()));
    }

    let unreadable = |source: PolarsError| SourceError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .map_err(unreadable)?
        .finish()
        .map_err(unreadable)
}

/// Fail with `MissingColumn` unless `table` has `column`
pub fn require_column(df: &DataFrame, table: &str, column: &str) -> Result<(), SourceError> {
    if df.get_column_names().iter().any(|name| name.as_str() == column) {
        Ok(())
    } else {
        Err(SourceError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }
}
