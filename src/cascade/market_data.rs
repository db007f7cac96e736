//! Lazily memoized multi-timeframe view over one raw series

use super::{OhlcResampler, Resampler};
use crate::error::{HistoryError, Result};
use crate::series::{aggregate_quotes, CandleSeries, RawSeries};
use crate::telemetry::{record_timeframe, CounterMetric};
use crate::timeframe::{infer_base, BasePlan, Timeframe};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Raw series plus every timeframe derived from it so far
///
/// Not safe for concurrent mutation: use one instance per session.
pub struct MarketData<R = OhlcResampler> {
    raw: RawSeries,
    base: Timeframe,
    /// Materialized series; a missing key means not computed yet
    cache: BTreeMap<Timeframe, Arc<CandleSeries>>,
    resampler: R,
}

impl MarketData {
    /// Infer the base timeframe and materialize it
    pub fn new(raw: RawSeries) -> Result<Self> {
        Self::with_resampler(raw, OhlcResampler)
    }
}

impl<R: Resampler> MarketData<R> {
    /// Build with a custom aggregation hook
    pub fn with_resampler(raw: RawSeries, resampler: R) -> Result<Self> {
        let (base, series) = match &raw {
            RawSeries::Quotes(quotes) => (Timeframe::M1, aggregate_quotes(quotes, Timeframe::M1)),
            RawSeries::Candles(candles) => match infer_base(&candles.index())? {
                BasePlan::Exact(tf) => (tf, candles.clone()),
                BasePlan::Aggregate(tf) => {
                    record_timeframe(CounterMetric::Aggregation, tf);
                    (tf, resampler.resample(candles, tf))
                }
            },
        };

        tracing::info!(
            schema = ?raw.schema(),
            raw_rows = raw.len(),
            base = %base,
            base_rows = series.len(),
            "Materialized base timeframe"
        );

        let mut cache = BTreeMap::new();
        cache.insert(base, Arc::new(series));

        Ok(Self {
            raw,
            base,
            cache,
            resampler,
        })
    }

    /// Candles at `timeframe`
    ///
    /// Fixed timeframes are computed once from the next finer entry and
    /// cached. Months are recomputed on every call.
    pub fn get(&mut self, timeframe: Timeframe) -> Result<Arc<CandleSeries>> {
        if timeframe < self.base {
            return Err(HistoryError::BelowBaseGranularity {
                requested: timeframe,
                base: self.base,
            });
        }

        if !timeframe.is_fixed() {
            return self.fresh_calendar(timeframe);
        }

        if let Some(series) = self.cache.get(&timeframe) {
            record_timeframe(CounterMetric::CacheHit, timeframe);
            return Ok(Arc::clone(series));
        }

        let finer = self.get(self.source_of(timeframe))?;
        let series = Arc::new(self.aggregate(&finer, timeframe));
        self.cache.insert(timeframe, Arc::clone(&series));
        Ok(series)
    }

    /// Variable-length entries bypass the cache entirely
    fn fresh_calendar(&mut self, timeframe: Timeframe) -> Result<Arc<CandleSeries>> {
        let finer = self.get(self.source_of(timeframe))?;
        Ok(Arc::new(self.aggregate(&finer, timeframe)))
    }

    fn source_of(&self, timeframe: Timeframe) -> Timeframe {
        timeframe
            .source()
            .filter(|source| *source >= self.base)
            .unwrap_or(self.base)
    }

    fn aggregate(&self, finer: &CandleSeries, target: Timeframe) -> CandleSeries {
        let series = self.resampler.resample(finer, target);
        record_timeframe(CounterMetric::Aggregation, target);
        tracing::debug!(
            timeframe = %target,
            input_rows = finer.len(),
            output_rows = series.len(),
            "Aggregated timeframe"
        );
        series
    }

    /// Inferred base timeframe
    pub fn base(&self) -> Timeframe {
        self.base
    }

    /// The validated input table
    pub fn raw(&self) -> &RawSeries {
        &self.raw
    }

    /// Whether `timeframe` is currently held in the cache
    pub fn is_cached(&self, timeframe: Timeframe) -> bool {
        self.cache.contains_key(&timeframe)
    }

    /// Cached timeframes in ladder order
    pub fn cached_timeframes(&self) -> Vec<Timeframe> {
        self.cache.keys().copied().collect()
    }

    /// Timeframes reachable from the base
    pub fn available_timeframes(&self) -> Vec<Timeframe> {
        Timeframe::LADDER
            .iter()
            .copied()
            .filter(|tf| *tf >= self.base)
            .collect()
    }
}
