use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Hard ceiling on an ingested feed, bytes. Declared lengths above this
    /// are refused before any buffering happens.
    pub max_feed_size: usize,
    /// Budget for reading one request body, milliseconds.
    pub body_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".parse().expect("valid literal"),
            max_feed_size: pico_feed::MAX_FEED_SIZE,
            body_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Absent keys fall back to defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }
}
