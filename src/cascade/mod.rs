//! Cascade module
//!
//! Derives every coarser timeframe from the inferred base on demand,
//! one ladder step at a time

mod market_data;
mod resampler;

pub use market_data::MarketData;
pub use resampler::{OhlcResampler, Resampler};
