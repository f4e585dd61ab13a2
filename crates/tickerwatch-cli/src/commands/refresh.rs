use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());

    if client.refresh_now().await? {
        println!("Refresh cycle started.");
    } else {
        println!("A refresh cycle is already in progress; trigger dropped.");
    }

    Ok(())
}
