//! imagebot - Telegram image generation bot

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use imagebot::{Config, ImageBot};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Telegram bot that turns text prompts into images
#[derive(Parser, Debug)]
#[command(name = "imagebot", version, about)]
struct Args {
    /// Path to a TOML config file (default: imagebot.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (json, text) = if args.json_logs {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagebot=info".into()),
        )
        .with(json)
        .with(text)
        .init();

    let config = Config::load(args.config.as_deref())?;
    info!("Loaded configuration: {:?}", config);

    let bot = ImageBot::new(config)?;
    bot.run().await?;

    Ok(())
}
