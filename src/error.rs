//! Error types
//!
//! Only the I/O edges of the crate return errors. The advisory core recovers
//! from degraded input on its own and reports the recovery through `tracing`,
//! tagged with a [`DegradedInput`] kind.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain one of the external inputs (historical tables, live weather)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Recoverable input conditions the core absorbs instead of failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedInput {
    /// An expected historical table is absent
    MissingSource,
    /// A non-numeric entry in a numeric column
    MalformedValue,
    /// A crop name not present in the rule tables
    UnknownCrop,
    /// Zero area or zero cost in a ratio
    DivisionGuard,
}

impl DegradedInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradedInput::MissingSource => "missing_source",
            DegradedInput::MalformedValue => "malformed_value",
            DegradedInput::UnknownCrop => "unknown_crop",
            DegradedInput::DivisionGuard => "division_guard",
        }
    }
}

impl fmt::Display for DegradedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
