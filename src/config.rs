//! Configuration types for backtest-history

use crate::data::{HistorySource, ParquetSource, YahooConfig, YahooSource, YAHOO_API_URL};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub telemetry: TelemetryConfig,
}

/// Which provider raw history comes from
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Parquet,
    Yahoo,
}

/// Data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub source: SourceKind,
    /// Directory of `<symbol>.parquet` files
    pub data_dir: PathBuf,

    /// Yahoo chart API base URL
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_yahoo_base_url() -> String {
    YAHOO_API_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl DataConfig {
    /// Build the configured provider
    pub fn build_source(&self) -> anyhow::Result<Box<dyn HistorySource>> {
        let source: Box<dyn HistorySource> = match self.source {
            SourceKind::Parquet => Box::new(ParquetSource::new(self.data_dir.clone())),
            SourceKind::Yahoo => Box::new(YahooSource::with_config(YahooConfig {
                base_url: self.yahoo_base_url.clone(),
                timeout: Duration::from_secs(self.request_timeout_secs),
            })?),
        };
        Ok(source)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
