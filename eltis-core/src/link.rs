//! Serial link parameters
//!
//! Describes how to reach the board. Actual I/O lives in the
//! `eltis-hardware` crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rate of the door controller board
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout applied to every link operation
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

/// Fixed parameters used to open a serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Upper bound for a single read or write, in milliseconds
    pub read_timeout_ms: u64,
}

impl LinkSettings {
    /// Read timeout as a [`Duration`]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// A resolved device path together with its link settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    pub path: String,
    pub settings: LinkSettings,
}

impl DeviceRef {
    pub fn new(path: impl Into<String>, settings: LinkSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_link_settings() {
        let settings = LinkSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.read_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_device_ref_new() {
        let device = DeviceRef::new("/dev/ttyACM0", LinkSettings::default());
        assert_eq!(device.path, "/dev/ttyACM0");
        assert_eq!(device.settings.baud_rate, DEFAULT_BAUD_RATE);
    }
}
