//! End-to-end tests: configuration, Parquet storage, cascade and replay

use backtest_history::config::{Config, SourceKind};
use backtest_history::data::{HistoryRequest, HistorySource, ParquetWriter};
use backtest_history::series::{Candle, CandleSeries};
use backtest_history::{MarketData, RawSeries, ReplayCursor, Timeframe};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.data.source, SourceKind::Parquet);
    assert!(config.telemetry.metrics_port.is_none());
}

#[tokio::test]
async fn test_parquet_history_through_cascade() {
    let temp_dir = TempDir::new().unwrap();
    let start = Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap();

    let candles: Vec<Candle> = (0..288)
        .map(|i| {
            let open = dec!(1.08) + Decimal::from(i % 9) / dec!(1000);
            Candle {
                timestamp: start + Duration::minutes(5 * i),
                open,
                high: open + dec!(0.002),
                low: open - dec!(0.002),
                close: open + dec!(0.001),
            }
        })
        .collect();
    let writer = ParquetWriter::new(temp_dir.path().to_path_buf());
    writer
        .write_candles(
            &temp_dir.path().join("EURUSD.parquet"),
            &CandleSeries::new(candles),
        )
        .unwrap();

    let toml = format!(
        r#"
        [data]
        source = "parquet"
        data_dir = "{}"

        [telemetry]
        log_level = "info"
        "#,
        temp_dir.path().display()
    );
    let config: Config = toml::from_str(&toml).unwrap();
    let source = config.data.build_source().unwrap();

    let frame = source
        .fetch(&HistoryRequest::new("EURUSD", "M5", start))
        .await
        .unwrap();
    let mut data = MarketData::new(RawSeries::from_frame(frame).unwrap()).unwrap();
    assert_eq!(data.base(), Timeframe::M5);

    let daily = data.get(Timeframe::D1).unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(ReplayCursor::candles(&daily).count(), 4);
}
