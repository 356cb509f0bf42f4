//! ELTIS Core Library
//!
//! Shared types, frame encoding and configuration for the ELTIS door
//! release daemon. This crate performs no I/O.

pub mod api;
pub mod config;
pub mod error;
pub mod link;
pub mod protocol;

// Re-export commonly used types
pub use config::{
    default_config_path, DeviceConfig, InitResponsePolicy, ServerConfig, StaticConfig,
};
pub use error::*;
pub use link::{DeviceRef, LinkSettings};
pub use protocol::{encode_frame, Command, DoorId, Frame, FRAME_LEN};
