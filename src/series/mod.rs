//! Series module
//!
//! The input table contract, validated candle/quote series and the bucket
//! aggregation rules shared by every cascade step

mod frame;
mod resample;
mod types;

pub use frame::Frame;
pub use resample::{aggregate_candles, aggregate_quotes};
pub use types::{
    Candle, CandleSeries, Quote, QuoteSeries, RawSeries, Schema, CANDLE_COLUMNS, QUOTE_COLUMNS,
};
