use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use image_update_checker::app::App;
use image_update_checker::config::{AppConfig, DEFAULT_CONFIG_PATH};
use image_update_checker::logging::init_logging;

#[derive(Parser)]
#[command(name = "image-update-checker")]
#[command(version, about = "Detects newer registry images for running Docker containers")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run a single check and exit (default)
    #[arg(long, conflicts_with = "daemon")]
    once: bool,

    /// Keep running and check on the configured interval
    #[arg(long)]
    daemon: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let _guard = init_logging(&config.logging, &config.env.log_level)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app = App::from_config(&config)?;
            if cli.daemon && !cli.once {
                app.run_daemon().await
            } else {
                info!("Running single check");
                app.run_once().await.map(|_| ())
            }
        })
}
