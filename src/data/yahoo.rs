//! Yahoo Finance chart API client
//!
//! Fetches OHLC bars for a symbol and converts them into a candle frame.
//! Rows where the provider reports a null field are dropped.

use super::{HistoryRequest, HistorySource};
use crate::error::{HistoryError, Result};
use crate::series::Frame;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo chart API base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the chart API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Interval labels Yahoo serves, with the query value for each
pub const YAHOO_INTERVALS: [(&str, &str); 13] = [
    ("M1", "1m"),
    ("M2", "2m"),
    ("M5", "5m"),
    ("M15", "15m"),
    ("M30", "30m"),
    ("M60", "60m"),
    ("M90", "90m"),
    ("H1", "1h"),
    ("D1", "1d"),
    ("D5", "5d"),
    ("W1", "1wk"),
    ("MN1", "1mo"),
    ("MN3", "3mo"),
];

/// Yahoo query value for an interval label, if offered
pub fn yahoo_interval(label: &str) -> Option<&'static str> {
    YAHOO_INTERVALS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
        .map(|(_, query)| *query)
}

/// Client for the Yahoo chart API
pub struct YahooSource {
    config: YahooConfig,
    client: Client,
}

impl YahooSource {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: YahooConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HistoryError::unavailable)?;

        Ok(Self { config, client })
    }

    async fn fetch_chart(
        &self,
        request: &HistoryRequest,
        interval: &str,
    ) -> anyhow::Result<ChartResponse> {
        let url = format!("{}/v8/finance/chart/{}", self.config.base_url, request.symbol);
        let end = request.end.unwrap_or_else(Utc::now);

        tracing::debug!(url = %url, interval, "Fetching chart from Yahoo");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", request.start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", interval.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl HistorySource for YahooSource {
    async fn fetch(&self, request: &HistoryRequest) -> Result<Frame> {
        let interval = yahoo_interval(&request.interval).ok_or_else(|| {
            let valid: Vec<&str> = YAHOO_INTERVALS.iter().map(|(name, _)| *name).collect();
            HistoryError::DataUnavailable(format!(
                "Not valid interval: {}, valid intervals: {}",
                request.interval,
                valid.join(", ")
            ))
        })?;

        let chart = self
            .fetch_chart(request, interval)
            .await
            .map_err(HistoryError::unavailable)?;
        let frame = chart_to_frame(chart)?;

        tracing::info!(
            symbol = %request.symbol,
            interval,
            rows = frame.len(),
            "Loaded history from Yahoo"
        );
        Ok(frame)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

/// Convert a chart response into a candle frame
fn chart_to_frame(chart: ChartResponse) -> Result<Frame> {
    if let Some(err) = chart.chart.error {
        return Err(HistoryError::DataUnavailable(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    let result = chart
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| HistoryError::DataUnavailable("empty chart result".to_string()))?;
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| HistoryError::DataUnavailable("missing quote block".to_string()))?;

    let mut index = Vec::new();
    let mut fields: [Vec<Decimal>; 4] = Default::default();

    for (i, ts) in result.timestamp.unwrap_or_default().into_iter().enumerate() {
        let row = [&quote.open, &quote.high, &quote.low, &quote.close]
            .map(|col| col.get(i).copied().flatten().and_then(Decimal::from_f64));
        let (Some(time), [Some(o), Some(h), Some(l), Some(c)]) =
            (DateTime::from_timestamp(ts, 0), row)
        else {
            continue;
        };

        // Yahoo occasionally repeats the last bar with a live timestamp
        if index.last().is_some_and(|last| *last >= time) {
            continue;
        }

        index.push(time);
        for (column, value) in fields.iter_mut().zip([o, h, l, c]) {
            column.push(value);
        }
    }

    if index.is_empty() {
        return Err(HistoryError::DataUnavailable("no bars returned".to_string()));
    }

    let [open, high, low, close] = fields;
    Frame::new(index)
        .with_column("Open", open)?
        .with_column("High", high)?
        .with_column("Low", low)?
        .with_column("Close", close)
}

// Yahoo API response types

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}
