//! Resample command implementation

use super::SourceArgs;
use crate::cascade::MarketData;
use crate::config::Config;
use crate::data::ParquetWriter;
use crate::timeframe::Timeframe;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ResampleArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Target timeframe
    #[arg(long)]
    pub timeframe: Timeframe,

    /// Output directory for Parquet files
    #[arg(long, default_value = "./output")]
    pub output: PathBuf,
}

impl ResampleArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let raw = self.source.load(config).await?;
        let mut data = MarketData::new(raw)?;
        let series = data.get(self.timeframe)?;

        let writer = ParquetWriter::new(self.output.clone());
        let path = writer.file_path(&self.source.symbol, self.timeframe);
        writer.write_candles(&path, &series)?;

        tracing::info!(
            path = ?path,
            timeframe = %self.timeframe,
            rows = series.len(),
            "Wrote resampled candles"
        );
        Ok(())
    }
}
