use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());
    let settings = client.get_watch().await?;

    println!("Keywords: {}", settings.keywords.join(", "));
    println!("Refresh interval: {} seconds", settings.refresh_interval_secs);
    println!("Prompt:\n  {}", settings.prompt);

    Ok(())
}
