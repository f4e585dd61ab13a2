//! IPC client for the control surface
//!
//! One typed method per daemon RPC.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::*;
use crate::{Error, Result};

/// Client for communicating with the daemon
#[derive(Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Check if the daemon is reachable
    pub async fn ping(&self) -> Result<bool> {
        match self.call(methods::PING, serde_json::Value::Null).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Get daemon status
    pub async fn status(&self) -> Result<StatusResponse> {
        let result = self.call(methods::STATUS, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Get the live watch settings
    pub async fn get_watch(&self) -> Result<WatchSettingsResponse> {
        let result = self.call(methods::WATCH_GET, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Replace the keyword list
    pub async fn set_keywords(&self, keywords: Vec<String>) -> Result<()> {
        let params = serde_json::to_value(SetKeywordsParams { keywords })?;
        self.call(methods::WATCH_SET_KEYWORDS, params).await?;
        Ok(())
    }

    /// Replace the summarization prompt
    pub async fn set_prompt(&self, prompt: String) -> Result<()> {
        let params = serde_json::to_value(SetPromptParams { prompt })?;
        self.call(methods::WATCH_SET_PROMPT, params).await?;
        Ok(())
    }

    /// Change the refresh interval
    pub async fn set_interval(&self, secs: i64) -> Result<()> {
        let params = serde_json::to_value(SetIntervalParams { secs })?;
        self.call(methods::WATCH_SET_INTERVAL, params).await?;
        Ok(())
    }

    /// Request an immediate refresh cycle
    pub async fn refresh_now(&self) -> Result<bool> {
        let result = self.call(methods::REFRESH_NOW, serde_json::Value::Null).await?;
        let response: RefreshNowResponse = serde_json::from_value(result)?;
        Ok(response.accepted)
    }

    /// Send a request and receive a response
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            Error::Other(format!(
                "Failed to connect to daemon at {}: {}. Is the daemon running?",
                self.socket_path.display(),
                e
            ))
        })?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let request = Request::new(method).with_params(params);
        let request_json = serde_json::to_string(&request)?;

        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut response_line = String::new();
        reader.read_line(&mut response_line).await?;

        let response: Response = serde_json::from_str(&response_line)?;

        if let Some(error) = response.error {
            return Err(Error::Other(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        response
            .result
            .ok_or_else(|| Error::Other("Empty response".to_string()))
    }
}
