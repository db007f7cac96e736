use backtest_history::cli::{Cli, Commands};
use backtest_history::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _telemetry = backtest_history::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Inspect(args) => args.execute(&config).await?,
        Commands::Resample(args) => {
            tracing::info!(timeframe = %args.timeframe, "Starting resample");
            args.execute(&config).await?;
        }
        Commands::Replay(args) => args.execute(&config).await?,
        Commands::Config => {
            println!("Current configuration:");
            println!("  Source: {:?}", config.data.source);
            println!("  Data dir: {}", config.data.data_dir.display());
            println!("  Request timeout: {}s", config.data.request_timeout_secs);
            println!(
                "  Logging: {} ({:?})",
                config.telemetry.log_level, config.telemetry.log_format
            );
            match config.telemetry.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
