use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vetta_mcp::{McpServer, ToolRegistry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub sse: SseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Seconds between heartbeat events on `/sse`
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config_path`, falling back to defaults when
    /// the file does not exist.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        ensure!(
            config.sse.heartbeat_interval_secs > 0,
            "sse.heartbeat_interval_secs must be greater than zero"
        );

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.sse.heartbeat_interval_secs)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
    pub heartbeat_interval: Duration,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let registry = ToolRegistry::with_validators();
        tracing::info!("Registered {} tools", registry.len());

        Self {
            mcp: Arc::new(McpServer::new(registry)),
            heartbeat_interval: config.heartbeat_interval(),
        }
    }
}
