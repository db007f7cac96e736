//! Replay command implementation

use super::SourceArgs;
use crate::cascade::MarketData;
use crate::config::Config;
use crate::replay::ReplayCursor;
use crate::timeframe::Timeframe;
use clap::Args;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Replay candles at this timeframe instead of the raw table
    #[arg(long)]
    pub timeframe: Option<Timeframe>,

    /// Stop after this many observations
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let raw = self.source.load(config).await?;
        match self.timeframe {
            Some(timeframe) => {
                let mut data = MarketData::new(raw)?;
                let series = data.get(timeframe)?;
                self.stream(ReplayCursor::candles(&series));
            }
            None => self.stream(ReplayCursor::from_raw(&raw)),
        }
        Ok(())
    }

    fn stream(&self, mut cursor: ReplayCursor<'_>) {
        let limit = self.limit.unwrap_or(usize::MAX);
        let total = cursor.len();

        let mut emitted = 0;
        for observation in cursor.replay().take(limit) {
            println!("{}\t{}", observation.ask, observation.bid);
            emitted += 1;
        }

        tracing::info!(emitted, total, "Replay finished");
    }
}
