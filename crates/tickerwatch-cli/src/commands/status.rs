use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());

    if !client.ping().await? {
        println!("Daemon is not running.");
        return Ok(());
    }

    let status = client.status().await?;

    println!("Daemon is running.");
    println!("  Uptime: {} seconds", status.uptime_secs);
    if status.cycle_in_progress {
        println!("  Refresh cycle in progress");
    } else {
        println!("  Next refresh in: {} seconds", status.countdown_secs);
    }

    Ok(())
}
