//! API models for the door REST API

use serde::{Deserialize, Serialize};

use crate::config::InitResponsePolicy;
use crate::protocol::DoorId;

/// Generic API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ApiResponse<T> {
    #[serde(rename = "success")]
    Success { data: T },
    #[serde(rename = "error")]
    Error { code: u16, error: String },
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    /// Create an error response carrying its HTTP status code
    pub fn error(code: u16, error: String) -> Self {
        Self::Error { code, error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of a completed door-open sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponse {
    /// Door that was released
    pub door: DoorId,
    /// Device path the frames were written to
    pub device: String,
    /// Hex dump of the Init reply, if one was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_response: Option<String>,
}

/// Server information response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    /// Service name
    pub service: String,
    /// Server version
    pub version: String,
    /// Explicit device path, if configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Discovery pattern used when no path is configured
    pub pattern: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Init reply handling
    pub init_response: InitResponsePolicy,
    /// Whether the in-memory link is used instead of real hardware
    pub mock: bool,
    /// Server uptime in seconds
    pub uptime: u64,
}
