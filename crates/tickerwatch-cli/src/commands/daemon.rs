use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tracing::info;

use tickerwatch_core::{
    ai::Summarizer,
    dedup::DeliveryLog,
    notify::DiscordNotifier,
    scheduler::{CycleContext, SchedulerService},
    source::YahooFinanceSource,
    storage::{Database, KeywordRepository},
    AppConfig, DaemonServer, WatchStore,
};

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("tickerwatch")
        .join("daemon.pid")
}

/// Check if the daemon is running
fn is_daemon_running() -> Option<u32> {
    let pid_path = pid_file_path();
    if !pid_path.exists() {
        return None;
    }

    let mut file = fs::File::open(&pid_path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    let pid: u32 = contents.trim().parse().ok()?;

    #[cfg(unix)]
    {
        use std::process::Command;
        let output = Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .output()
            .ok()?;
        if output.status.success() {
            return Some(pid);
        }
    }

    // Process not running, clean up stale PID file
    let _ = fs::remove_file(&pid_path);
    None
}

fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(&pid_path)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(())
}

fn remove_pid_file() {
    let _ = fs::remove_file(pid_file_path());
}

/// Run the watcher daemon in the foreground
pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    if let Some(pid) = is_daemon_running() {
        println!("Daemon is already running (PID: {})", pid);
        return Ok(());
    }

    let channel_id = config
        .discord
        .channel_id
        .clone()
        .ok_or_else(|| anyhow!("Discord channel_id not configured in config.toml"))?;

    let db = Arc::new(Database::new(&config).await?);

    // Persisted keywords win over the config defaults.
    let mut watch_defaults = config.watch.clone();
    watch_defaults.keywords = KeywordRepository::new(&db).load().await?;
    let watch_store = Arc::new(WatchStore::new(watch_defaults));

    let ctx = Arc::new(CycleContext {
        channel_id,
        source: Arc::new(YahooFinanceSource::new(&config.source)?),
        summarizer: Arc::new(Summarizer::new(&config)?),
        delivery_log: Arc::new(DeliveryLog::new()),
        notifier: Arc::new(DiscordNotifier::new(&config.discord)?),
    });

    let (scheduler, handle) = SchedulerService::new(Arc::clone(&watch_store), ctx);
    let server = DaemonServer::new(
        config.socket_path(),
        Arc::clone(&watch_store),
        handle,
        Arc::clone(&db),
    );

    write_pid_file()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    println!(
        "Daemon started (PID: {}). Press Ctrl+C or run 'tickerwatch stop' to stop.",
        std::process::id()
    );
    println!("  Keywords: {}", watch_store.keywords().join(", "));
    println!("  Refresh interval: {} seconds", watch_store.refresh_interval_secs());

    let (_, server_result) = tokio::join!(scheduler.run(shutdown_rx.clone()), server.run(shutdown_rx));
    server_result?;

    remove_pid_file();
    println!("Daemon stopped.");

    Ok(())
}

/// Stop a running daemon
pub async fn stop() -> Result<()> {
    match is_daemon_running() {
        Some(pid) => {
            println!("Stopping daemon (PID: {})...", pid);

            #[cfg(unix)]
            {
                use std::process::Command;
                let output = Command::new("kill")
                    .arg("-TERM")
                    .arg(pid.to_string())
                    .output()?;

                if output.status.success() {
                    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

                    if is_daemon_running().is_none() {
                        println!("Daemon stopped successfully.");
                    } else {
                        let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
                        remove_pid_file();
                        println!("Daemon forcefully terminated.");
                    }
                } else {
                    println!(
                        "Failed to stop daemon. You may need to kill it manually: kill {}",
                        pid
                    );
                }
            }
        }
        None => {
            println!("Daemon is not running.");
        }
    }

    Ok(())
}
