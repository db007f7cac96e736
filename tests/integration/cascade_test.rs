//! Integration tests for the timeframe cascade

use backtest_history::series::{Frame, RawSeries};
use backtest_history::{HistoryError, MarketData, Timeframe};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap()
}

fn candle_frame(step: Duration, rows: &[(Decimal, Decimal, Decimal, Decimal)]) -> Frame {
    let index = (0..rows.len())
        .map(|i| start() + step * (i as i32))
        .collect();
    Frame::new(index)
        .with_column("Open", rows.iter().map(|r| r.0).collect())
        .unwrap()
        .with_column("High", rows.iter().map(|r| r.1).collect())
        .unwrap()
        .with_column("Low", rows.iter().map(|r| r.2).collect())
        .unwrap()
        .with_column("Close", rows.iter().map(|r| r.3).collect())
        .unwrap()
}

#[test]
fn test_three_minutes_collapse_into_one_bucket() {
    let frame = candle_frame(
        Duration::minutes(1),
        &[
            (dec!(1), dec!(3), dec!(0.5), dec!(2)),
            (dec!(2), dec!(4), dec!(1), dec!(3)),
            (dec!(3), dec!(5), dec!(2), dec!(4)),
        ],
    );
    let mut data = MarketData::new(RawSeries::from_frame(frame).unwrap()).unwrap();
    assert_eq!(data.base(), Timeframe::M1);

    let m5 = data.get(Timeframe::M5).unwrap();
    assert_eq!(m5.len(), 1);
    let bar = m5.get(0).unwrap();
    assert_eq!(
        (bar.open, bar.high, bar.low, bar.close),
        (dec!(1), dec!(5), dec!(0.5), dec!(4))
    );
}

#[test]
fn test_finer_than_base_is_rejected() {
    let rows = vec![(dec!(1), dec!(2), dec!(0.5), dec!(1.5)); 12];
    let frame = candle_frame(Duration::minutes(5), &rows);
    let mut data = MarketData::new(RawSeries::from_frame(frame).unwrap()).unwrap();

    assert_eq!(data.base(), Timeframe::M5);
    assert!(matches!(
        data.get(Timeframe::M1),
        Err(HistoryError::BelowBaseGranularity {
            requested: Timeframe::M1,
            base: Timeframe::M5
        })
    ));
}

#[test]
fn test_missing_both_schemas_fails_construction() {
    let frame = Frame::new(vec![start(), start() + Duration::minutes(1)])
        .with_column("Last", vec![dec!(1), dec!(2)])
        .unwrap();
    assert!(matches!(
        RawSeries::from_frame(frame),
        Err(HistoryError::InvalidSchema { .. })
    ));
}

#[test]
fn test_unsupported_native_interval() {
    let rows = vec![(dec!(1), dec!(2), dec!(0.5), dec!(1.5)); 5];
    let frame = candle_frame(Duration::minutes(11), &rows);
    let result = MarketData::new(RawSeries::from_frame(frame).unwrap());
    assert!(matches!(
        result,
        Err(HistoryError::UnsupportedGranularity { .. })
    ));
}

#[test]
fn test_quotes_build_minute_base() {
    let index: Vec<_> = (0..120).map(|i| start() + Duration::seconds(i)).collect();
    let asks: Vec<_> = (0..120)
        .map(|i| dec!(1.1000) + Decimal::from(i % 7) / dec!(10000))
        .collect();
    let bids: Vec<_> = asks.iter().map(|a| a - dec!(0.0002)).collect();
    let frame = Frame::new(index)
        .with_column("Ask", asks)
        .unwrap()
        .with_column("Bid", bids)
        .unwrap();

    let mut data = MarketData::new(RawSeries::from_frame(frame).unwrap()).unwrap();
    assert_eq!(data.base(), Timeframe::M1);
    assert_eq!(data.get(Timeframe::M1).unwrap().len(), 2);
    assert_eq!(data.get(Timeframe::H1).unwrap().len(), 1);
}
