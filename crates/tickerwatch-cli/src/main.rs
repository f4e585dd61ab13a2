use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tickerwatch_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tickerwatch")]
#[command(version, about = "Keyword-driven stock news watcher with AI summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the watcher daemon in the foreground
    Run,
    /// Stop a running daemon
    Stop,
    /// Show daemon status
    Status,
    /// Show the live watch settings
    Show,
    /// Replace the watched keyword list
    Keywords {
        /// New keyword list, in order
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Replace the summarization prompt
    Prompt {
        /// New prompt text
        prompt: String,
    },
    /// Change the refresh interval
    Interval {
        /// Seconds between refresh cycles
        secs: i64,
    },
    /// Trigger an immediate refresh cycle
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);

    match cli.command {
        Commands::Run => commands::daemon::run(config).await,
        Commands::Stop => commands::daemon::stop().await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Show => commands::show::run(&config).await,
        Commands::Keywords { keywords } => commands::keywords::run(&config, keywords).await,
        Commands::Prompt { prompt } => commands::prompt::run(&config, prompt).await,
        Commands::Interval { secs } => commands::interval::run(&config, secs).await,
        Commands::Refresh => commands::refresh::run(&config).await,
    }
}
