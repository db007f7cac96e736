//! Error taxonomy for history construction, resampling and replay

use crate::timeframe::Timeframe;
use chrono::Duration;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, HistoryError>;

/// History errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    /// Columns match neither the candle nor the quote schema
    #[error("Invalid columns: {columns:?}")]
    InvalidSchema { columns: Vec<String> },
    /// Native sampling interval fits no ladder entry
    #[error("Unsupported sampling interval: {interval}")]
    UnsupportedGranularity { interval: Duration },
    /// Requested timeframe is finer than the inferred base
    #[error("Cannot infer {requested} data from a {base} base")]
    BelowBaseGranularity {
        requested: Timeframe,
        base: Timeframe,
    },
    /// Replay cursor is exhausted
    #[error("No more data available")]
    NoMoreData,
    /// External acquisition failed
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    /// Table violates the input contract (ordering, column lengths)
    #[error("Malformed table: {0}")]
    MalformedTable(String),
    /// Too few rows to observe a sampling interval
    #[error("Need at least 2 rows to infer granularity, got {rows}")]
    InsufficientHistory { rows: usize },
}

impl HistoryError {
    /// Wrap any provider-specific failure as `DataUnavailable`
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
