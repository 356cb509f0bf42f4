//! Info handler for server and device configuration

use crate::api::error::ApiError;
use crate::api::AppState;

use axum::{extract::State, Json};
use eltis_core::api::{ApiResponse, InfoResponse};
use tracing::debug;

/// Retrieve server information.
///
/// # Endpoint
///
/// `GET /api/v0/info`
///
/// # Returns
///
/// - `service` - Service name
/// - `version` - Server version
/// - `device` / `pattern` - How the board is located
/// - `baud_rate` / `read_timeout_ms` - Link parameters
/// - `init_response` - Init reply policy
/// - `mock` - Whether the in-memory link is active
/// - `uptime` - Server uptime in seconds
///
/// Never touches the serial device and does not wait for a running door
/// sequence.
pub(crate) async fn get_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InfoResponse>>, ApiError> {
    debug!("Request: GET /api/v0/info");

    let settings = state.controller.settings();

    let info = InfoResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        device: state.device.path.clone(),
        pattern: state.device.pattern.clone(),
        baud_rate: settings.baud_rate,
        read_timeout_ms: settings.read_timeout_ms,
        init_response: state.controller.init_policy(),
        mock: state.mock,
        uptime: state.start_time.elapsed().as_secs(),
    };

    Ok(Json(ApiResponse::success(info)))
}
