//! Acquisition boundary shared by every data provider

use crate::error::Result;
use crate::series::Frame;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// What to fetch from a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Instrument symbol (e.g., "EURUSD", "AAPL")
    pub symbol: String,
    /// Provider interval label, upper-cased (e.g., "M1", "M15", "D5")
    ///
    /// Wider than the ladder: off-ladder intervals are aggregated to the
    /// next ladder entry they divide once the table is loaded.
    pub interval: String,
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end, open-ended when `None`
    pub end: Option<DateTime<Utc>>,
}

impl HistoryRequest {
    /// Create a request with no end bound
    pub fn new(symbol: impl Into<String>, interval: &str, start: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.to_ascii_uppercase(),
            start,
            end: None,
        }
    }

    /// Set the exclusive end bound
    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

/// Trait for historical data providers
///
/// Implementations report every provider failure as
/// `HistoryError::DataUnavailable`.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch a time-indexed table for the request
    async fn fetch(&self, request: &HistoryRequest) -> Result<Frame>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}
