//! Configuration types for the door daemon
//!
//! - [`StaticConfig`] - server and device settings, loaded once at startup
//! - [`DeviceConfig`] - serial device path or discovery pattern, link parameters
//!   and the Init reply policy
//!
//! Nothing is persisted at runtime.

mod device;
mod paths;
mod static_config;

pub use device::{DeviceConfig, InitResponsePolicy, DEFAULT_DEVICE_PATTERN};
pub use paths::{default_config_path, CONFIG_ENV_VAR};
pub use static_config::{normalize_listen_addr, ServerConfig, StaticConfig, DEFAULT_LISTEN};
