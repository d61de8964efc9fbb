use std::time::Duration;

use serde::Deserialize;

use crate::channel::{DEFAULT_MAX_RETRIES, ReconnectPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub channel: ChannelConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the snapshot push channel lives and how hard to try reaching it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub host: String,
    #[serde(default = "default_channel_port")]
    pub port: u16,
    #[serde(default = "default_channel_path")]
    pub path: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_channel_port() -> u16 {
    8080
}

fn default_channel_path() -> String {
    "/ws".into()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl ChannelConfig {
    /// `ws://host:port/path` (or `wss://` with tls).
    pub fn endpoint(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            retry_delay: Duration::from_millis(self.reconnect_delay_ms),
            max_retries: self.max_retries,
        }
    }
}

/// Read API that mirrors the store for presentation clients.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_enabled")]
    pub enabled: bool,
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Max number of store updates buffered for /ws/issues (slow clients may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_server_enabled() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".into()
}

fn default_server_port() -> u16 {
    8090
}

fn default_broadcast_capacity() -> usize {
    16
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_server_enabled(),
            host: default_server_host(),
            port: default_server_port(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.channel.host.is_empty(),
            "channel.host must be non-empty"
        );
        anyhow::ensure!(
            self.channel.port > 0,
            "channel.port must be between 1 and 65535, got {}",
            self.channel.port
        );
        anyhow::ensure!(
            self.channel.path.starts_with('/'),
            "channel.path must start with '/', got {:?}",
            self.channel.path
        );
        anyhow::ensure!(
            self.channel.reconnect_delay_ms > 0,
            "channel.reconnect_delay_ms must be > 0, got {}",
            self.channel.reconnect_delay_ms
        );
        if self.server.enabled {
            anyhow::ensure!(
                self.server.port > 0,
                "server.port must be between 1 and 65535, got {}",
                self.server.port
            );
            anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
            anyhow::ensure!(
                self.server.broadcast_capacity > 0,
                "server.broadcast_capacity must be > 0, got {}",
                self.server.broadcast_capacity
            );
        }
        Ok(())
    }
}
