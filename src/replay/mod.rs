//! Replay module
//!
//! Restartable cursors that flatten a candle or quote table into a stream
//! of observations, one data point per call, to simulate watching the
//! market tick by tick.

mod candle;
mod tick;

pub use candle::FIELDS_PER_CANDLE;

use crate::error::{HistoryError, Result};
use crate::series::{CandleSeries, QuoteSeries, RawSeries};
use crate::telemetry::record_replay;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single replayed price point
///
/// Candle replay puts the same field value in both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Price a buy would fill at
    pub ask: Decimal,
    /// Price a sell would fill at
    pub bid: Decimal,
}

impl Observation {
    /// Observation with no spread
    pub fn flat(value: Decimal) -> Self {
        Self {
            ask: value,
            bid: value,
        }
    }
}

/// Cursor position; `field` stays 0 for tick replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorState {
    pub row: usize,
    pub field: usize,
}

/// Coarse lifecycle of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Active,
    Exhausted,
}

/// What a cursor walks over
#[derive(Debug, Clone, Copy)]
enum ReplaySource<'a> {
    Candles(&'a CandleSeries),
    Ticks(&'a QuoteSeries),
}

/// Restartable cursor over a borrowed series
#[derive(Debug, Clone)]
pub struct ReplayCursor<'a> {
    source: ReplaySource<'a>,
    state: CursorState,
}

impl<'a> ReplayCursor<'a> {
    /// Replay candles as Open, High, Low, Close per row
    pub fn candles(series: &'a CandleSeries) -> Self {
        Self {
            source: ReplaySource::Candles(series),
            state: CursorState::default(),
        }
    }

    /// Replay quotes as one (ask, bid) per row
    pub fn ticks(quotes: &'a QuoteSeries) -> Self {
        Self {
            source: ReplaySource::Ticks(quotes),
            state: CursorState::default(),
        }
    }

    /// Pick the variant from the raw table's schema
    pub fn from_raw(raw: &'a RawSeries) -> Self {
        match raw {
            RawSeries::Candles(series) => Self::candles(series),
            RawSeries::Quotes(quotes) => Self::ticks(quotes),
        }
    }

    /// Tick replay over a raw table, which must have the quote schema
    ///
    /// The error reports the columns the validated table holds. To report
    /// the full input column set, validate the frame with
    /// `QuoteSeries::from_frame` and use [`ReplayCursor::ticks`].
    pub fn ticks_from_raw(raw: &'a RawSeries) -> Result<Self> {
        match raw {
            RawSeries::Quotes(quotes) => Ok(Self::ticks(quotes)),
            RawSeries::Candles(_) => Err(HistoryError::InvalidSchema {
                columns: raw.columns(),
            }),
        }
    }

    /// Produce the next observation
    pub fn next_observation(&mut self) -> Result<Observation> {
        let (observation, variant) = match self.source {
            ReplaySource::Candles(series) => {
                (candle::next_field(series, &mut self.state)?, "candle")
            }
            ReplaySource::Ticks(quotes) => (tick::next_quote(quotes, &mut self.state)?, "tick"),
        };
        record_replay(variant);
        Ok(observation)
    }

    /// Rewind to the first observation
    pub fn reset(&mut self) {
        self.state = CursorState::default();
    }

    /// Rewind and iterate from the start
    pub fn replay(&mut self) -> &mut Self {
        self.reset();
        self
    }

    /// Current position
    pub fn position(&self) -> CursorState {
        self.state
    }

    /// Rows in the underlying series
    pub fn rows(&self) -> usize {
        match self.source {
            ReplaySource::Candles(series) => series.len(),
            ReplaySource::Ticks(quotes) => quotes.len(),
        }
    }

    /// Observations in one full pass
    pub fn len(&self) -> usize {
        match self.source {
            ReplaySource::Candles(series) => series.len() * FIELDS_PER_CANDLE,
            ReplaySource::Ticks(quotes) => quotes.len(),
        }
    }

    /// Whether a full pass yields nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observations left before exhaustion
    pub fn remaining(&self) -> usize {
        let consumed = match self.source {
            ReplaySource::Candles(_) => self.state.row * FIELDS_PER_CANDLE + self.state.field,
            ReplaySource::Ticks(_) => self.state.row,
        };
        self.len().saturating_sub(consumed)
    }

    /// Lifecycle phase
    pub fn phase(&self) -> Phase {
        if self.is_exhausted() {
            Phase::Exhausted
        } else if self.state == CursorState::default() {
            Phase::Ready
        } else {
            Phase::Active
        }
    }

    /// Whether `next_observation` would fail with `NoMoreData`
    pub fn is_exhausted(&self) -> bool {
        self.state.field == 0 && self.state.row >= self.rows()
    }
}

impl Iterator for ReplayCursor<'_> {
    type Item = Observation;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_observation().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}
