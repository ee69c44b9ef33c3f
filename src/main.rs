use std::path::PathBuf;
use clap::Parser;
use log::info;
use streamertag::config::Config;
use streamertag::{logging, run, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "streamertag", version, about = "Per-user streaming tag for a shared chat service")]
struct Args {
    /// Path to the config file; created with defaults if missing
    #[arg(short, long, default_value = Config::CONFIG_PATH)]
    config: PathBuf,

    /// Overrides the configured log level (error, warn, info, debug, verbose)
    #[arg(short, long)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    logging::init(args.log_level.unwrap_or(config.log_level))?;
    info!("Using config at {}", config.path().display());

    run(config).await?;

    Ok(())
}
