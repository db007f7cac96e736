//! Parquet storage for history tables

use super::{HistoryRequest, HistorySource};
use crate::error::{HistoryError, Result};
use crate::series::{CandleSeries, Frame, CANDLE_COLUMNS, QUOTE_COLUMNS};
use crate::timeframe::Timeframe;
use arrow::array::{Array, ArrayRef, AsArray, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Field, Float32Type, Float64Type, Int64Type, Schema,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Names accepted for the timestamp column
///
/// pandas and yfinance write the index as `Datetime` (intraday) or `Date`.
const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "time", "datetime", "date"];

/// Candle schema fields
pub fn candle_schema() -> Schema {
    let mut fields = vec![Field::new(
        "timestamp",
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        false,
    )];
    // Store as string for Decimal precision
    fields.extend(
        CANDLE_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false)),
    );
    Schema::new(fields)
}

/// Parquet writer for derived candle series
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// File path for a symbol at a timeframe
    pub fn file_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.parquet", symbol, timeframe.label()))
    }

    /// Write candles to a Parquet file
    pub fn write_candles(&self, path: &Path, series: &CandleSeries) -> anyhow::Result<()> {
        if series.is_empty() {
            return Ok(());
        }

        self.ensure_dir()?;

        let schema = Arc::new(candle_schema());
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let timestamps: Vec<i64> = series
            .iter()
            .map(|c| c.timestamp.timestamp_micros())
            .collect();

        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))];

        for position in 0..CANDLE_COLUMNS.len() {
            let values: Vec<Option<String>> = series
                .iter()
                .map(|c| c.field(position).map(|v| v.to_string()))
                .collect();
            columns.push(Arc::new(StringArray::from(values)));
        }

        let batch = RecordBatch::try_new(schema, columns)?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = series.len(), "Wrote candles to Parquet");

        Ok(())
    }
}

/// Reader for Parquet files
pub struct ParquetReader {
    path: PathBuf,
}

impl ParquetReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the whole file into a frame
    ///
    /// The index is the first column with a known timestamp name, falling
    /// back to the first timestamp-typed column. Price columns are renamed
    /// to their canonical form (`ask` -> `Ask`). Other numeric columns are
    /// kept as-is; string columns and columns with nulls or non-finite
    /// values are dropped.
    pub fn read_frame(&self) -> anyhow::Result<Frame> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let mut index: Vec<DateTime<Utc>> = Vec::new();
        let mut columns: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
        let mut skipped: BTreeSet<String> = BTreeSet::new();

        for batch_result in reader {
            let batch = batch_result?;
            let schema = batch.schema();

            let ts_pos = timestamp_position(&schema)
                .ok_or_else(|| anyhow::anyhow!("Missing timestamp column"))?;
            index.extend(decode_timestamps(batch.column(ts_pos))?);

            for (pos, field) in schema.fields().iter().enumerate() {
                if pos == ts_pos {
                    continue;
                }
                let name = canonical_name(field.name());
                let is_price = is_price_column(&name);
                if skipped.contains(&name) {
                    continue;
                }
                match decode_decimals(batch.column(pos), is_price)
                    .map_err(|e| anyhow::anyhow!("Invalid {} column: {}", name, e))?
                {
                    Some(values) => columns.entry(name).or_default().extend(values),
                    None => {
                        // A column dropped in any batch is dropped for the whole file
                        columns.remove(&name);
                        skipped.insert(name);
                    }
                }
            }
        }

        if !skipped.is_empty() {
            tracing::debug!(path = ?self.path, columns = ?skipped, "Ignored unreadable columns");
        }

        let mut frame = Frame::new(index);
        for (name, values) in columns {
            frame = frame.with_column(name, values)?;
        }
        Ok(frame)
    }

    /// Get the file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn timestamp_position(schema: &Schema) -> Option<usize> {
    let fields = schema.fields();
    fields
        .iter()
        .position(|f| {
            TIMESTAMP_COLUMNS
                .iter()
                .any(|name| f.name().eq_ignore_ascii_case(name))
        })
        .or_else(|| {
            fields.iter().position(|f| {
                matches!(
                    f.data_type(),
                    DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64
                )
            })
        })
}

fn is_price_column(name: &str) -> bool {
    CANDLE_COLUMNS.contains(&name) || QUOTE_COLUMNS.contains(&name)
}

fn canonical_name(name: &str) -> String {
    CANDLE_COLUMNS
        .iter()
        .chain(QUOTE_COLUMNS.iter())
        .find(|c| c.eq_ignore_ascii_case(name))
        .map_or_else(|| name.to_string(), |c| c.to_string())
}

fn decode_timestamps(column: &ArrayRef) -> anyhow::Result<Vec<DateTime<Utc>>> {
    if column.null_count() > 0 {
        anyhow::bail!("Null timestamps");
    }

    let converted: Vec<Option<DateTime<Utc>>> = match column.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => column
            .as_primitive::<TimestampSecondType>()
            .values()
            .iter()
            .map(|v| DateTime::from_timestamp(*v, 0))
            .collect(),
        DataType::Timestamp(TimeUnit::Millisecond, _) => column
            .as_primitive::<TimestampMillisecondType>()
            .values()
            .iter()
            .map(|v| DateTime::from_timestamp_millis(*v))
            .collect(),
        DataType::Timestamp(TimeUnit::Microsecond, _) => column
            .as_primitive::<TimestampMicrosecondType>()
            .values()
            .iter()
            .map(|v| DateTime::from_timestamp_micros(*v))
            .collect(),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => column
            .as_primitive::<TimestampNanosecondType>()
            .values()
            .iter()
            .map(|v| Some(DateTime::from_timestamp_nanos(*v)))
            .collect(),
        DataType::Date32 => column
            .as_primitive::<Date32Type>()
            .values()
            .iter()
            .map(|days| DateTime::from_timestamp(i64::from(*days) * 86_400, 0))
            .collect(),
        DataType::Date64 => column
            .as_primitive::<Date64Type>()
            .values()
            .iter()
            .map(|v| DateTime::from_timestamp_millis(*v))
            .collect(),
        // Broker terminals export epoch seconds
        DataType::Int64 => column
            .as_primitive::<Int64Type>()
            .values()
            .iter()
            .map(|v| DateTime::from_timestamp(*v, 0))
            .collect(),
        other => anyhow::bail!("Unsupported timestamp type {}", other),
    };

    converted
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| anyhow::anyhow!("Timestamp out of range"))
}

/// Decode a numeric column
///
/// Price columns must decode completely. Any other column yields `None`
/// when it is not numeric or holds nulls or non-finite values.
fn decode_decimals(column: &ArrayRef, is_price: bool) -> anyhow::Result<Option<Vec<Decimal>>> {
    if column.null_count() > 0 {
        if is_price {
            anyhow::bail!("Null values");
        }
        return Ok(None);
    }

    let values: Option<Vec<Decimal>> = match column.data_type() {
        DataType::Float64 => column
            .as_primitive::<Float64Type>()
            .values()
            .iter()
            .map(|v| Decimal::from_f64(*v))
            .collect(),
        DataType::Float32 => column
            .as_primitive::<Float32Type>()
            .values()
            .iter()
            .map(|v| Decimal::from_f32(*v))
            .collect(),
        DataType::Int64 => column
            .as_primitive::<Int64Type>()
            .values()
            .iter()
            .map(|v| Some(Decimal::from(*v)))
            .collect(),
        DataType::Utf8 if is_price => {
            let strings = column.as_string::<i32>();
            let mut parsed = Vec::with_capacity(strings.len());
            for s in strings.iter().flatten() {
                parsed.push(Decimal::from_str(s)?);
            }
            Some(parsed)
        }
        _ => return Ok(None),
    };

    match values {
        Some(values) => Ok(Some(values)),
        None if is_price => anyhow::bail!("Non-finite value"),
        None => Ok(None),
    }
}

/// Reads `<data_dir>/<symbol>.parquet`
pub struct ParquetSource {
    data_dir: PathBuf,
}

impl ParquetSource {
    /// Create a source over a directory of Parquet files
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// File holding a symbol's history
    pub fn file_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.parquet", symbol))
    }
}

#[async_trait]
impl HistorySource for ParquetSource {
    async fn fetch(&self, request: &HistoryRequest) -> Result<Frame> {
        let path = self.file_path(&request.symbol);
        if !path.exists() {
            return Err(HistoryError::DataUnavailable(format!(
                "no history for {} at {}",
                request.symbol,
                path.display()
            )));
        }

        let reader = ParquetReader::new(path);
        let frame = tokio::task::spawn_blocking(move || reader.read_frame())
            .await
            .map_err(HistoryError::unavailable)?
            .map_err(HistoryError::unavailable)?
            .slice_time(Some(request.start), request.end);

        if frame.is_empty() {
            return Err(HistoryError::DataUnavailable(format!(
                "no rows for {} in requested range",
                request.symbol
            )));
        }

        tracing::info!(
            symbol = %request.symbol,
            rows = frame.len(),
            columns = ?frame.column_names(),
            "Loaded history from Parquet"
        );
        Ok(frame)
    }

    fn name(&self) -> &'static str {
        "parquet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Candle, RawSeries};
    use crate::timeframe::{infer_base, BasePlan};
    use arrow::array::{Float64Array, Int64Array, TimestampNanosecondArray};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap()
    }

    fn sample_candles() -> CandleSeries {
        CandleSeries::new(
            (0..3)
                .map(|i| Candle {
                    timestamp: start() + Duration::minutes(i),
                    open: dec!(1.0850) + Decimal::from(i) / dec!(10000),
                    high: dec!(1.0860),
                    low: dec!(1.0840),
                    close: dec!(1.0855),
                })
                .collect(),
        )
    }

    #[test]
    fn test_candle_schema() {
        let schema = candle_schema();
        assert_eq!(schema.fields().len(), 5);
        assert_eq!(schema.field(0).name(), "timestamp");
        assert_eq!(schema.field(1).name(), "Open");
        assert_eq!(schema.field(4).name(), "Close");
    }

    #[test]
    fn test_writer_file_path() {
        let writer = ParquetWriter::new(PathBuf::from("/data"));
        assert_eq!(
            writer.file_path("EURUSD", Timeframe::H4),
            PathBuf::from("/data/EURUSD_H4.parquet")
        );
    }

    #[test]
    fn test_write_and_read_candles() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(temp_dir.path().to_path_buf());
        let series = sample_candles();

        let path = writer.file_path("EURUSD", Timeframe::M1);
        writer.write_candles(&path, &series).unwrap();

        let frame = ParquetReader::new(path).read_frame().unwrap();
        assert_eq!(frame.column_names(), vec!["Close", "High", "Low", "Open"]);

        let RawSeries::Candles(read) = RawSeries::from_frame(frame).unwrap() else {
            panic!("expected candles");
        };
        assert_eq!(read, series);
    }

    #[test]
    fn test_write_empty_candles() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(temp_dir.path().to_path_buf());

        let path = writer.file_path("EURUSD", Timeframe::M1);
        writer.write_candles(&path, &CandleSeries::default()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_read_broker_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("EURUSD.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Int64, false),
            Field::new("ask", DataType::Float64, false),
            Field::new("bid", DataType::Float64, false),
            Field::new("flags", DataType::Int64, false),
        ]));
        let base = start().timestamp();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![base, base + 1])),
                Arc::new(Float64Array::from(vec![1.25, 1.5])),
                Arc::new(Float64Array::from(vec![1.0, 1.25])),
                Arc::new(Int64Array::from(vec![6, 6])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let frame = ParquetReader::new(path).read_frame().unwrap();
        assert_eq!(frame.column_names(), vec!["Ask", "Bid", "flags"]);
        assert_eq!(frame.index()[1], start() + Duration::seconds(1));
        assert_eq!(frame.column("Ask"), Some(&[dec!(1.25), dec!(1.5)][..]));
    }

    fn write_batch(path: &Path, batch: &RecordBatch) {
        let mut writer =
            ArrowWriter::try_new(File::create(path).unwrap(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_nullable_extra_columns_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("EURUSD.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Int64, false),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("Volume", DataType::Float64, true),
            Field::new("Spread", DataType::Float64, false),
            Field::new("note", DataType::Utf8, true),
        ]));
        let base = start().timestamp();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![base, base + 60])),
                Arc::new(Float64Array::from(vec![1.0, 2.0])),
                Arc::new(Float64Array::from(vec![3.0, 4.0])),
                Arc::new(Float64Array::from(vec![0.5, 1.0])),
                Arc::new(Float64Array::from(vec![2.0, 3.0])),
                Arc::new(Float64Array::from(vec![Some(5.0), None])),
                Arc::new(Float64Array::from(vec![f64::NAN, 1.0])),
                Arc::new(StringArray::from(vec![Some("roll"), None])),
            ],
        )
        .unwrap();
        write_batch(&path, &batch);

        let frame = ParquetReader::new(path).read_frame().unwrap();
        assert_eq!(frame.column_names(), vec!["Close", "High", "Low", "Open"]);
        assert!(matches!(
            RawSeries::from_frame(frame).unwrap(),
            RawSeries::Candles(_)
        ));
    }

    #[test]
    fn test_null_price_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("EURUSD.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Int64, false),
            Field::new("Ask", DataType::Float64, true),
            Field::new("Bid", DataType::Float64, false),
        ]));
        let base = start().timestamp();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![base, base + 1])),
                Arc::new(Float64Array::from(vec![Some(1.25), None])),
                Arc::new(Float64Array::from(vec![1.0, 1.25])),
            ],
        )
        .unwrap();
        write_batch(&path, &batch);

        let err = ParquetReader::new(path).read_frame().unwrap_err();
        assert!(err.to_string().contains("Invalid Ask column"));
    }

    #[test]
    fn test_read_pandas_index_names() {
        let temp_dir = TempDir::new().unwrap();
        let base = start().timestamp_nanos_opt().unwrap();
        let minute = 60_000_000_000;

        for index_name in ["Datetime", "Date", "__index_level_0__"] {
            let path = temp_dir.path().join(format!("{index_name}.parquet"));
            let schema = Arc::new(Schema::new(vec![
                Field::new("Open", DataType::Float64, false),
                Field::new("High", DataType::Float64, false),
                Field::new("Low", DataType::Float64, false),
                Field::new("Close", DataType::Float64, false),
                Field::new(
                    index_name,
                    DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                    false,
                ),
            ]));
            let batch = RecordBatch::try_new(
                schema,
                vec![
                    Arc::new(Float64Array::from(vec![1.0, 2.0])),
                    Arc::new(Float64Array::from(vec![3.0, 4.0])),
                    Arc::new(Float64Array::from(vec![0.5, 1.0])),
                    Arc::new(Float64Array::from(vec![2.0, 3.0])),
                    Arc::new(
                        TimestampNanosecondArray::from(vec![base, base + minute])
                            .with_timezone("UTC"),
                    ),
                ],
            )
            .unwrap();
            write_batch(&path, &batch);

            let frame = ParquetReader::new(path).read_frame().unwrap();
            assert_eq!(
                frame.index(),
                &[start(), start() + Duration::minutes(1)][..],
                "{index_name}"
            );
            assert_eq!(frame.column_names(), vec!["Close", "High", "Low", "Open"]);
        }
    }

    #[tokio::test]
    async fn test_off_ladder_history_aggregates_base() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(temp_dir.path().to_path_buf());
        let series = CandleSeries::new(
            (0..8)
                .map(|i| Candle {
                    timestamp: start() + Duration::minutes(15 * i),
                    open: dec!(1.0850),
                    high: dec!(1.0860),
                    low: dec!(1.0840),
                    close: dec!(1.0855),
                })
                .collect(),
        );
        writer
            .write_candles(&temp_dir.path().join("EURUSD.parquet"), &series)
            .unwrap();

        let source = ParquetSource::new(temp_dir.path().to_path_buf());
        let frame = source
            .fetch(&HistoryRequest::new("EURUSD", "m15", start()))
            .await
            .unwrap();
        let RawSeries::Candles(candles) = RawSeries::from_frame(frame).unwrap() else {
            panic!("expected candles");
        };
        assert_eq!(
            infer_base(&candles.index()).unwrap(),
            BasePlan::Aggregate(Timeframe::M30)
        );
    }

    #[tokio::test]
    async fn test_source_filters_range() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(temp_dir.path().to_path_buf());
        writer
            .write_candles(&temp_dir.path().join("EURUSD.parquet"), &sample_candles())
            .unwrap();

        let source = ParquetSource::new(temp_dir.path().to_path_buf());
        let request = HistoryRequest::new("EURUSD", "M1", start() + Duration::minutes(1));
        let frame = source.fetch(&request).await.unwrap();
        assert_eq!(frame.len(), 2);
    }

    #[tokio::test]
    async fn test_source_missing_symbol() {
        let temp_dir = TempDir::new().unwrap();
        let source = ParquetSource::new(temp_dir.path().to_path_buf());
        let request = HistoryRequest::new("NOPE", "M1", start());

        let err = source.fetch(&request).await.unwrap_err();
        assert!(matches!(err, HistoryError::DataUnavailable(_)));
    }
}
