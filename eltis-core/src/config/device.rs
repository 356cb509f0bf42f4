//! Serial device configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::link::{LinkSettings, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};
use crate::EltisError;

/// Glob scanned for the board when no explicit path is configured
pub const DEFAULT_DEVICE_PATTERN: &str = "/dev/ttyACM*";

/// What to do with the board's reply to the Init frame.
///
/// The reply content is never inspected under any policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitResponsePolicy {
    /// Read the reply, log a failed read and carry on
    #[default]
    BestEffort,
    /// Read the reply and abort the sequence if the read fails
    Required,
    /// Do not read a reply at all
    Skip,
}

impl InitResponsePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitResponsePolicy::BestEffort => "best-effort",
            InitResponsePolicy::Required => "required",
            InitResponsePolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for InitResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitResponsePolicy {
    type Err = EltisError;

    /// Parse the policy from string (for CLI --init-response flag)
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use eltis_core::config::InitResponsePolicy;
    ///
    /// assert_eq!(InitResponsePolicy::from_str("required").unwrap(), InitResponsePolicy::Required);
    /// assert!(InitResponsePolicy::from_str("always").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best-effort" | "besteffort" | "lenient" => Ok(InitResponsePolicy::BestEffort),
            "required" | "strict" => Ok(InitResponsePolicy::Required),
            "skip" | "none" => Ok(InitResponsePolicy::Skip),
            _ => Err(EltisError::InvalidInput(format!(
                "Unknown init response policy: '{}'. Valid options: best-effort, required, skip",
                s
            ))),
        }
    }
}

/// Serial device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Explicit device path. Disables discovery when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Glob used for discovery; the lexicographically first match wins
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Serial baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Read/write timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Handling of the Init reply
    #[serde(default)]
    pub init_response: InitResponsePolicy,
}

fn default_pattern() -> String {
    DEFAULT_DEVICE_PATTERN.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: None,
            pattern: default_pattern(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            init_response: InitResponsePolicy::default(),
        }
    }
}

impl DeviceConfig {
    /// Link parameters derived from this configuration
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            baud_rate: self.baud_rate,
            read_timeout_ms: self.read_timeout_ms,
        }
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> crate::Result<()> {
        if self.baud_rate == 0 {
            return Err(EltisError::Config("baud_rate must be positive".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(EltisError::Config(
                "read_timeout_ms must be positive".to_string(),
            ));
        }
        if self.path.is_none() && self.pattern.trim().is_empty() {
            return Err(EltisError::Config(
                "either a device path or a discovery pattern is required".to_string(),
            ));
        }
        Ok(())
    }
}
