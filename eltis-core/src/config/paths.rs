//! Default path resolution for the configuration file
//!
//! Uses XDG Base Directory specification when available, with a system-wide fallback.

use std::path::PathBuf;

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV_VAR: &str = "ELTIS_CONFIG";

/// Returns the default path for the static configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/eltis/config.toml`
/// - Fallback: `/etc/eltis/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("eltis")
        .join("config.toml")
}
