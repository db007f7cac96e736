//! Aggregation hook used by the cascade

use crate::series::{aggregate_candles, CandleSeries};
use crate::timeframe::Timeframe;

/// Turns a finer candle series into a coarser one
pub trait Resampler {
    /// Aggregate `source` into `target` buckets
    fn resample(&self, source: &CandleSeries, target: Timeframe) -> CandleSeries;
}

/// OHLC first/max/min/last aggregation
#[derive(Debug, Clone, Copy, Default)]
pub struct OhlcResampler;

impl Resampler for OhlcResampler {
    fn resample(&self, source: &CandleSeries, target: Timeframe) -> CandleSeries {
        aggregate_candles(source, target)
    }
}

impl<R: Resampler + ?Sized> Resampler for &R {
    fn resample(&self, source: &CandleSeries, target: Timeframe) -> CandleSeries {
        (**self).resample(source, target)
    }
}
