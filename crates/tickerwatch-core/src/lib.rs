pub mod ai;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ipc;
pub mod notify;
pub mod scheduler;
pub mod source;
pub mod storage;
pub mod watch;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use ipc::{DaemonClient, DaemonServer};
pub use watch::{WatchSnapshot, WatchStore};
