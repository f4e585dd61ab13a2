use anyhow::Result;

use tickerwatch_core::{AppConfig, DaemonClient};

pub async fn run(config: &AppConfig, secs: i64) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());
    client.set_interval(secs).await?;

    println!("Refresh interval set to {} seconds.", secs);
    println!("The new cadence applies from the next cycle start.");

    Ok(())
}
