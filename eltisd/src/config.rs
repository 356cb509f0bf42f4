//! Configuration loading
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, the TOML config file, built-in defaults.

use eltis_core::{EltisError, InitResponsePolicy, Result, StaticConfig};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load the static config file.
///
/// A missing file is not an error: defaults are used and nothing is written.
pub(crate) async fn load_static_config(path: &Path) -> Result<StaticConfig> {
    if !path.exists() {
        info!(
            "Config file not found at {}. Using defaults.",
            path.display()
        );
        return Ok(StaticConfig::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| EltisError::Config(format!("Failed to read config file: {}", e)))?;

    let config = StaticConfig::from_toml(&content)
        .map_err(|e| EltisError::Config(format!("Failed to parse config file: {}", e)))?;

    debug!("Loaded config: {:?}", config);
    Ok(config)
}

/// Values given on the command line
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub listen: Option<String>,
    pub device: Option<String>,
    pub pattern: Option<String>,
    pub init_response: Option<InitResponsePolicy>,
}

impl Overrides {
    /// Apply command-line values on top of the file configuration.
    ///
    /// `--pattern` without `--device` re-enables discovery even if the file
    /// names an explicit device.
    pub fn apply(self, config: &mut StaticConfig) {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }

        match (self.device, self.pattern) {
            (Some(device), pattern) => {
                config.device.path = Some(device);
                if let Some(pattern) = pattern {
                    config.device.pattern = pattern;
                }
            }
            (None, Some(pattern)) => {
                config.device.path = None;
                config.device.pattern = pattern;
            }
            (None, None) => {}
        }

        if let Some(policy) = self.init_response {
            config.device.init_response = policy;
        }
    }
}
