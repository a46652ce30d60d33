use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration, usually read from a YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cors: Option<CorsConfig>,
    pub static_files: Vec<StaticMountConfig>,
}

/// Listener address and per-connection limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// How long a fresh connection may stay silent before it is dropped
    pub first_byte_timeout_ms: u64,
    /// Bound on every subsequent line or body read
    pub read_timeout_ms: u64,
    pub max_line_bytes: usize,
    pub max_headers: usize,
    pub max_body_bytes: usize,
    /// Port advertised to clients asking for a websocket upgrade
    pub websocket_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_origin")]
    pub origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticMountConfig {
    pub virtual_path: String,
    pub fs_path: String,
}

fn default_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            first_byte_timeout_ms: 5000,
            read_timeout_ms: 5000,
            max_line_bytes: 2048,
            max_headers: 32,
            max_body_bytes: 16 * 1024,
            websocket_port: 81,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn first_byte_timeout(&self) -> Duration {
        Duration::from_millis(self.first_byte_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Loads the file named by `CONFIG` (defaults when unset), then applies the
    /// `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&raw)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(raw).context("invalid YAML configuration")
    }
}
