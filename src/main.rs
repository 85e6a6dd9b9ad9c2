#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use clap::Parser;
use skychat::Config;
use skychat::app::dispatch::dispatch;
use skychat::cli::commands::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const LOG_LEVEL_ENV: &str = "SKYCHAT_LOG";

fn log_level() -> Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(Level::WARN)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the streamed reply on stdout stays clean.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    dispatch(cli, config).await
}
