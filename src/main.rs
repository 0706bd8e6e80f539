use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::info;

use clipbot::{AppConfig, ConsoleReporter, DownloadManager, GuildTier};

/// Download a video and normalize it to an h264 MP4
#[derive(Parser, Debug)]
#[command(name = "clipbot", version, about)]
struct Args {
    /// The URL of the video
    url: String,

    /// Guild subscription tier used to derive the size ceiling
    #[arg(long, value_enum, default_value = "none")]
    tier: GuildTier,

    /// Directory the finished video is copied into
    #[arg(long, default_value = "videos")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            AppConfig::default()
        }
    };

    let manager = DownloadManager::new(config);
    let reporter = Arc::new(ConsoleReporter::new(args.output));

    if let Err(e) = manager.submit(&args.url, args.tier, reporter.clone()).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    reporter.wait().await;
}
