//! IPC protocol for daemon-client communication
//!
//! JSON-RPC style request/response format over a Unix socket. This is the
//! control surface: everything an operator can change at runtime goes
//! through these methods.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON-RPC style request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// JSON-RPC style response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Uuid, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Uuid, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn ok(id: Uuid) -> Self {
        Self::success(id, serde_json::json!({"ok": true}))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// RPC error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

// Error codes
pub const ERR_PARSE: i32 = -32700;
pub const ERR_METHOD_NOT_FOUND: i32 = -32601;
pub const ERR_INVALID_PARAMS: i32 = -32602;
pub const ERR_INTERNAL: i32 = -32603;

// Method names
pub mod methods {
    pub const PING: &str = "ping";
    pub const STATUS: &str = "status";

    // Watch settings methods
    pub const WATCH_GET: &str = "watch.get";
    pub const WATCH_SET_KEYWORDS: &str = "watch.set_keywords";
    pub const WATCH_SET_PROMPT: &str = "watch.set_prompt";
    pub const WATCH_SET_INTERVAL: &str = "watch.set_interval";

    // Scheduler methods
    pub const REFRESH_NOW: &str = "refresh.now";
}

// Parameter structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetKeywordsParams {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPromptParams {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIntervalParams {
    pub secs: i64,
}

// Response structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime_secs: u64,
    pub cycle_in_progress: bool,
    pub countdown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettingsResponse {
    pub keywords: Vec<String>,
    pub prompt: String,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshNowResponse {
    /// Whether the scheduler was idle and the trigger started a cycle; a
    /// trigger landing on a running cycle is dropped.
    pub accepted: bool,
}
