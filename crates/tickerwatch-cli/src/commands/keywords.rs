use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig, keywords: Vec<String>) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());
    client.set_keywords(keywords.clone()).await?;

    println!("Keywords updated: {}", keywords.join(", "));
    println!("The new list applies from the next refresh cycle.");

    Ok(())
}
