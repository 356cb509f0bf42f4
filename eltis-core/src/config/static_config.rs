//! Static configuration loaded once at startup
//!
//! This configuration is read-only after the daemon starts.

use serde::{Deserialize, Serialize};

use super::device::DeviceConfig;

/// Default listen address, all interfaces on port 6976
pub const DEFAULT_LISTEN: &str = ":6976";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address. A bare `:port` means all interfaces.
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerConfig {
    /// Socket address suitable for binding a TCP listener
    pub fn bind_addr(&self) -> String {
        normalize_listen_addr(&self.listen)
    }
}

/// Expand a `:port` listen address to `0.0.0.0:port`.
///
/// Anything else is returned unchanged.
pub fn normalize_listen_addr(listen: &str) -> String {
    let listen = listen.trim();
    if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    }
}

/// Static configuration for the door daemon.
///
/// Located at `~/.config/eltis/config.toml` by default. Every section and
/// field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Serial device settings
    #[serde(default)]
    pub device: DeviceConfig,
}

impl StaticConfig {
    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
