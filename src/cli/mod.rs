//! CLI interface for backtest-history
//!
//! Provides subcommands for:
//! - `inspect`: Load history and report its inferred base timeframe
//! - `resample`: Write one timeframe of the cascade to Parquet
//! - `replay`: Stream observations the way a backtest engine sees them
//! - `config`: Show configuration

mod inspect;
mod replay;
mod resample;

pub use inspect::InspectArgs;
pub use replay::ReplayArgs;
pub use resample::ResampleArgs;

use crate::config::Config;
use crate::data::HistoryRequest;
use crate::series::RawSeries;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "backtest-history")]
#[command(about = "Multi-timeframe candle cascade and replay for backtesting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load history and report its base timeframe
    Inspect(InspectArgs),
    /// Write one timeframe to Parquet
    Resample(ResampleArgs),
    /// Stream replay observations
    Replay(ReplayArgs),
    /// Show configuration
    Config,
}

/// Arguments shared by every command that loads history
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Instrument symbol
    pub symbol: String,

    /// Start time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_time)]
    pub start: DateTime<Utc>,

    /// End time (RFC 3339 or YYYY-MM-DD), defaults to now
    #[arg(long, value_parser = parse_time)]
    pub end: Option<DateTime<Utc>>,

    /// Provider interval label (e.g., M1, M15, H2), may be off the ladder
    #[arg(long, default_value = "M1")]
    pub interval: String,
}

impl SourceArgs {
    /// Fetch and validate the raw table
    pub async fn load(&self, config: &Config) -> anyhow::Result<RawSeries> {
        let source = config.data.build_source()?;

        let mut request = HistoryRequest::new(self.symbol.clone(), &self.interval, self.start);
        if let Some(end) = self.end {
            request = request.until(end);
        }

        tracing::info!(
            source = source.name(),
            symbol = %self.symbol,
            interval = %request.interval,
            "Fetching history"
        );
        let frame = source.fetch(&request).await?;
        Ok(RawSeries::from_frame(frame)?)
    }
}

/// Parse an RFC 3339 timestamp or a plain date at midnight UTC
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| format!("Invalid time {s}: {e}"))
}
