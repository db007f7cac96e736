//! backtest-history: multi-timeframe market history for backtesting
//!
//! This library provides the core components for:
//! - Inferring the native timeframe of raw candle or bid/ask tick tables
//! - Lazily deriving every coarser timeframe, memoized per session
//! - Replaying candles or ticks one observation at a time
//! - Loading history from Parquet files or the Yahoo chart API
//! - Structured logging and metrics

pub mod cascade;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod replay;
pub mod series;
pub mod telemetry;
pub mod timeframe;

pub use cascade::MarketData;
pub use error::{HistoryError, Result};
pub use replay::{Observation, ReplayCursor};
pub use series::{CandleSeries, Frame, RawSeries};
pub use timeframe::Timeframe;
