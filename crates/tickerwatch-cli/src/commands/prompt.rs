use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig, prompt: String) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());
    client.set_prompt(prompt).await?;

    println!("Prompt updated. It applies from the next refresh cycle.");

    Ok(())
}
