//! Bucket aggregation of candles and quotes

use super::{Candle, CandleSeries, Quote, QuoteSeries};
use crate::timeframe::Timeframe;
use chrono::{DateTime, Utc};

/// Aggregate candles into `target` buckets
///
/// Open is the first open, High the max high, Low the min low and Close the
/// last close of each bucket. Empty buckets produce no row.
pub fn aggregate_candles(source: &CandleSeries, target: Timeframe) -> CandleSeries {
    let mut aggregated = Vec::new();
    let mut current: Option<Candle> = None;

    for candle in source {
        let bucket = target.bucket_start(candle.timestamp);

        match current.as_mut() {
            Some(agg) if agg.timestamp == bucket => {
                agg.high = agg.high.max(candle.high);
                agg.low = agg.low.min(candle.low);
                agg.close = candle.close;
            }
            _ => {
                if let Some(done) = current.take() {
                    aggregated.push(done);
                }
                current = Some(Candle {
                    timestamp: bucket,
                    ..*candle
                });
            }
        }
    }

    if let Some(done) = current {
        aggregated.push(done);
    }

    CandleSeries::new(aggregated)
}

/// Aggregate bid/ask quotes into `target` candles
///
/// Open and Close are the mid of the first and last quote, High is the
/// max ask and Low the min bid.
pub fn aggregate_quotes(source: &QuoteSeries, target: Timeframe) -> CandleSeries {
    let mut aggregated = Vec::new();
    let mut current: Option<(Candle, Quote)> = None;

    for quote in source.iter() {
        let bucket = target.bucket_start(quote.timestamp);

        match current.as_mut() {
            Some((agg, last)) if agg.timestamp == bucket => {
                agg.high = agg.high.max(quote.ask);
                agg.low = agg.low.min(quote.bid);
                *last = *quote;
            }
            _ => {
                if let Some(done) = current.take() {
                    aggregated.push(close_bucket(done));
                }
                current = Some((open_bucket(bucket, quote), *quote));
            }
        }
    }

    if let Some(done) = current {
        aggregated.push(close_bucket(done));
    }

    CandleSeries::new(aggregated)
}

fn open_bucket(bucket: DateTime<Utc>, first: &Quote) -> Candle {
    let mid = first.mid();
    Candle {
        timestamp: bucket,
        open: mid,
        high: first.ask,
        low: first.bid,
        close: mid,
    }
}

fn close_bucket((mut candle, last): (Candle, Quote)) -> Candle {
    candle.close = last.mid();
    candle
}
