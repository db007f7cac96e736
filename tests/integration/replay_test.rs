//! Integration tests for replay cursors

use backtest_history::series::{Frame, RawSeries};
use backtest_history::{HistoryError, MarketData, Observation, ReplayCursor, Timeframe};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()
}

fn quote_raw(n: i64) -> RawSeries {
    let index = (0..n).map(|i| start() + Duration::milliseconds(250 * i)).collect();
    let asks: Vec<_> = (0..n).map(|i| dec!(1.0850) + Decimal::from(i) / dec!(10000)).collect();
    let bids: Vec<_> = asks.iter().map(|a| a - dec!(0.0001)).collect();
    RawSeries::from_frame(
        Frame::new(index)
            .with_column("Ask", asks)
            .unwrap()
            .with_column("Bid", bids)
            .unwrap(),
    )
    .unwrap()
}

fn candle_raw(n: i64) -> RawSeries {
    let index = (0..n).map(|i| start() + Duration::minutes(i)).collect();
    let opens: Vec<_> = (0..n).map(|i| Decimal::from(100 + i % 5)).collect();
    let frame = Frame::new(index)
        .with_column("Open", opens.clone())
        .unwrap()
        .with_column("High", opens.iter().map(|o| o + dec!(2)).collect())
        .unwrap()
        .with_column("Low", opens.iter().map(|o| o - dec!(2)).collect())
        .unwrap()
        .with_column("Close", opens.iter().map(|o| o + dec!(1)).collect())
        .unwrap();
    RawSeries::from_frame(frame).unwrap()
}

#[test]
fn test_candle_replay_emits_four_per_row() {
    let raw = candle_raw(25);
    let mut cursor = ReplayCursor::from_raw(&raw);

    let mut count = 0;
    while cursor.next_observation().is_ok() {
        count += 1;
    }
    assert_eq!(count, 100);
    assert_eq!(cursor.next_observation(), Err(HistoryError::NoMoreData));
}

#[test]
fn test_candle_replay_restarts_identically() {
    let raw = candle_raw(10);
    let mut cursor = ReplayCursor::from_raw(&raw);

    let first: Vec<Observation> = cursor.by_ref().collect();
    cursor.reset();
    let second: Vec<Observation> = cursor.by_ref().collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|o| o.ask == o.bid));
}

#[test]
fn test_tick_replay_matches_rows() {
    let raw = quote_raw(40);
    let RawSeries::Quotes(quotes) = &raw else {
        panic!("expected quotes");
    };

    let observed: Vec<_> = ReplayCursor::ticks_from_raw(&raw).unwrap().collect();
    assert_eq!(observed.len(), 40);
    for (obs, quote) in observed.iter().zip(quotes.iter()) {
        assert_eq!((obs.ask, obs.bid), (quote.ask, quote.bid));
    }
}

#[test]
fn test_replay_over_cascade_view() {
    let raw = candle_raw(120);
    let mut data = MarketData::new(raw).unwrap();
    let hourly = data.get(Timeframe::H1).unwrap();

    let mut cursor = ReplayCursor::candles(&hourly);
    assert_eq!(cursor.len(), hourly.len() * 4);
    let first = cursor.next_observation().unwrap();
    assert_eq!(first.ask, hourly.get(0).unwrap().open);
}
