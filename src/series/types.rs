//! Candle and quote series built from validated frames

use super::Frame;
use crate::error::{HistoryError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Candle schema column names
pub const CANDLE_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// Quote schema column names
pub const QUOTE_COLUMNS: [&str; 2] = ["Ask", "Bid"];

/// Which of the two supported shapes a table has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Open/High/Low/Close
    Candle,
    /// Ask/Bid
    Quote,
}

impl Schema {
    /// Detect the schema of a frame
    ///
    /// Exactly one schema must be fully present. Extra columns are ignored.
    pub fn detect(frame: &Frame) -> Result<Self> {
        let candle = CANDLE_COLUMNS.iter().all(|c| frame.has_column(c));
        let quote = QUOTE_COLUMNS.iter().all(|c| frame.has_column(c));

        match (candle, quote) {
            (true, false) => Ok(Schema::Candle),
            (false, true) => Ok(Schema::Quote),
            _ => Err(HistoryError::InvalidSchema {
                columns: frame.column_names(),
            }),
        }
    }
}

/// A single OHLC bar, labelled by its bucket start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// Field value by position in Open, High, Low, Close order
    pub fn field(&self, position: usize) -> Option<Decimal> {
        match position {
            0 => Some(self.open),
            1 => Some(self.high),
            2 => Some(self.low),
            3 => Some(self.close),
            _ => None,
        }
    }
}

/// A bid/ask quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub timestamp: DateTime<Utc>,
    pub ask: Decimal,
    pub bid: Decimal,
}

impl Quote {
    /// Midpoint of ask and bid
    pub fn mid(&self) -> Decimal {
        (self.ask + self.bid) / Decimal::TWO
    }
}

/// Time-ordered candles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Wrap candles that are already in time order
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Whether there are no candles
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Candle at a row
    pub fn get(&self, row: usize) -> Option<&Candle> {
        self.candles.get(row)
    }

    /// All candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Iterate in time order
    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Timestamps of every row
    pub fn index(&self) -> Vec<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }

    /// First and last timestamp
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.candles.first()?.timestamp, self.candles.last()?.timestamp))
    }

    fn from_frame(frame: &Frame) -> Result<Self> {
        let [open, high, low, close] = CANDLE_COLUMNS.map(|c| frame.column(c));
        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            return Err(HistoryError::InvalidSchema {
                columns: frame.column_names(),
            });
        };

        let candles = frame
            .index()
            .iter()
            .enumerate()
            .map(|(i, ts)| Candle {
                timestamp: *ts,
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
            })
            .collect();

        Ok(Self { candles })
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

/// Time-ordered quotes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteSeries {
    quotes: Vec<Quote>,
}

impl QuoteSeries {
    /// Wrap quotes that are already in time order
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Number of quotes
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether there are no quotes
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Quote at a row
    pub fn get(&self, row: usize) -> Option<&Quote> {
        self.quotes.get(row)
    }

    /// All quotes
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Iterate in time order
    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    /// Validate a frame as tick data
    ///
    /// Fails with `InvalidSchema` naming every column of the frame when
    /// `Ask` or `Bid` is missing.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        check_ordering(frame)?;
        let (Some(ask), Some(bid)) = (frame.column("Ask"), frame.column("Bid")) else {
            return Err(HistoryError::InvalidSchema {
                columns: frame.column_names(),
            });
        };

        let quotes = frame
            .index()
            .iter()
            .enumerate()
            .map(|(i, ts)| Quote {
                timestamp: *ts,
                ask: ask[i],
                bid: bid[i],
            })
            .collect();

        Ok(Self { quotes })
    }
}

/// Validated raw input in one of the two supported schemas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSeries {
    Candles(CandleSeries),
    Quotes(QuoteSeries),
}

impl RawSeries {
    /// Validate a frame against the input contract
    ///
    /// Timestamps must be strictly increasing and exactly one schema present.
    pub fn from_frame(frame: Frame) -> Result<Self> {
        check_ordering(&frame)?;

        let raw = match Schema::detect(&frame)? {
            Schema::Candle => RawSeries::Candles(CandleSeries::from_frame(&frame)?),
            Schema::Quote => RawSeries::Quotes(QuoteSeries::from_frame(&frame)?),
        };
        tracing::debug!(schema = ?raw.schema(), rows = raw.len(), "Validated raw series");
        Ok(raw)
    }

    /// Schema of the underlying table
    pub fn schema(&self) -> Schema {
        match self {
            RawSeries::Candles(_) => Schema::Candle,
            RawSeries::Quotes(_) => Schema::Quote,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            RawSeries::Candles(series) => series.len(),
            RawSeries::Quotes(series) => series.len(),
        }
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamps of every row
    pub fn index(&self) -> Vec<DateTime<Utc>> {
        match self {
            RawSeries::Candles(series) => series.index(),
            RawSeries::Quotes(series) => series.iter().map(|q| q.timestamp).collect(),
        }
    }

    /// Columns held after validation
    ///
    /// Extra input columns are dropped by `from_frame`, so this is the
    /// schema's own column set.
    pub fn columns(&self) -> Vec<String> {
        let columns: &[&str] = match self {
            RawSeries::Candles(_) => &CANDLE_COLUMNS,
            RawSeries::Quotes(_) => &QUOTE_COLUMNS,
        };
        columns.iter().map(|c| c.to_string()).collect()
    }
}

fn check_ordering(frame: &Frame) -> Result<()> {
    match frame.index().windows(2).position(|w| w[1] <= w[0]) {
        Some(row) => Err(HistoryError::MalformedTable(format!(
            "timestamps not strictly increasing at row {}",
            row + 1
        ))),
        None => Ok(()),
    }
}
