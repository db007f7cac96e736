//! Inspect command implementation

use super::SourceArgs;
use crate::cascade::MarketData;
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl InspectArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let raw = self.source.load(config).await?;
        let (schema, rows) = (raw.schema(), raw.len());
        let data = MarketData::new(raw)?;

        println!("{}", self.source.symbol);
        println!("  Schema: {:?}", schema);
        println!("  Rows: {}", rows);
        println!("  Base timeframe: {}", data.base());
        let available: Vec<&str> = data
            .available_timeframes()
            .iter()
            .map(|tf| tf.label())
            .collect();
        println!("  Available: {}", available.join(", "));

        Ok(())
    }
}
