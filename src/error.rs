//! Error type shared by the engine, the data source and the report
//! service.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the engine, the data source and the report service.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("schedule assignment for {region} on {date} references unknown preset {preset_id}")]
    UnknownPreset {
        region: String,
        date: NaiveDate,
        preset_id: i64,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Whether the error came from the data source rather than from the
    /// request itself.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            EngineError::Io { .. } | EngineError::Json { .. } | EngineError::UnknownPreset { .. }
        )
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
