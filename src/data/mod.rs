//! Data acquisition module
//!
//! Adapters that produce a raw history table from a provider. Everything
//! behind this boundary surfaces as `DataUnavailable` on failure.

mod parquet;
mod source;
mod yahoo;

pub use self::parquet::{candle_schema, ParquetReader, ParquetSource, ParquetWriter};
pub use source::{HistoryRequest, HistorySource};
pub use yahoo::{yahoo_interval, YahooConfig, YahooSource, YAHOO_API_URL, YAHOO_INTERVALS};
