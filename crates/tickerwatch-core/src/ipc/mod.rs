pub mod client;
pub mod protocol;
pub mod server;

pub use client::DaemonClient;
pub use server::DaemonServer;
