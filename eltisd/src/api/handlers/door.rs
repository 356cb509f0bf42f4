//! Door release handlers

use crate::api::error::ApiError;
use crate::api::AppState;

use axum::{
    extract::{Path, State},
    Json,
};
use eltis_core::api::{ApiResponse, OpenResponse};
use eltis_core::protocol::to_hex;
use eltis_core::DoorId;
use tracing::debug;

/// Release door 0.
///
/// # Endpoint
///
/// `GET /` or `POST /`
pub(crate) async fn open_default(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OpenResponse>>, ApiError> {
    debug!("Request: open default door");
    open(&state, DoorId::default()).await
}

/// Release the door given in the path.
///
/// # Endpoint
///
/// `GET /open/:id` or `POST /open/:id`
///
/// # Parameters
///
/// - `id` - Door number. Anything that is not a non-negative integer selects door 0.
///
/// # Behavior
///
/// Waits for any door sequence already in progress. A stalled board holds the
/// request for up to the configured read timeout. The sequence runs to
/// completion even if the client disconnects.
pub(crate) async fn open_door(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<OpenResponse>>, ApiError> {
    debug!("Request: open door '{}'", raw_id);
    open(&state, DoorId::parse_lenient(&raw_id)).await
}

async fn open(state: &AppState, door: DoorId) -> Result<Json<ApiResponse<OpenResponse>>, ApiError> {
    let report = state.controller.open(door).await?;

    Ok(Json(ApiResponse::success(OpenResponse {
        door: report.door,
        device: report.device,
        init_response: report.init_response.as_deref().map(to_hex),
    })))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{app_with, fixed_devices, send};
    use axum::http::{Method, StatusCode};
    use eltis_core::{Command, DoorId, EltisError, Result};
    use eltis_hardware::{DeviceResolver, MockConnector};
    use std::sync::Arc;
    use std::time::Duration;

    fn open_frame(id: u32) -> Vec<u8> {
        Command::Open(DoorId(id)).encode().as_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_open_door_2_success() {
        let mock = MockConnector::new();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, body) = send(app, Method::GET, "/open/2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["door"], 2);
        assert_eq!(body["data"]["device"], "/dev/ttyACM0");

        let frames = mock.frames_written();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], Command::Init.encode().as_bytes().to_vec());
        assert_eq!(&frames[1][..4], &[0x7F, 0x42, 0x06, 0x0F]);
        assert!(frames[1][4..].iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn test_root_opens_door_0_with_get_and_post() {
        for method in [Method::GET, Method::POST] {
            let mock = MockConnector::new();
            let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

            let (status, body) = send(app, method, "/").await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["door"], 0);
            assert_eq!(mock.frames_written()[1], open_frame(0));
        }
    }

    #[tokio::test]
    async fn test_post_open_door() {
        let mock = MockConnector::new();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, _) = send(app, Method::POST, "/open/7").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(mock.frames_written()[1], open_frame(7));
    }

    #[tokio::test]
    async fn test_unparsable_id_defaults_to_door_0() {
        let mock = MockConnector::new();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, body) = send(app, Method::GET, "/open/front").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["door"], 0);
        assert_eq!(mock.frames_written()[1], open_frame(0));
    }

    #[tokio::test]
    async fn test_init_reply_is_reported_as_hex() {
        let mock = MockConnector::new().with_response(vec![0x7F, 0x0A]);
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (_, body) = send(app, Method::GET, "/open/1").await;

        assert_eq!(body["data"]["init_response"], "7F 0A");
    }

    #[tokio::test]
    async fn test_no_device_is_500_and_writes_nothing() {
        let mock = MockConnector::new();
        let app = app_with(fixed_devices(&[]), &mock);

        let (status, body) = send(app, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 500);
        assert_eq!(body["error"], "Device interface not found");
        assert!(mock.events().is_empty());
        assert!(mock.wire().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_is_500() {
        let mock = MockConnector::new().failing_connect();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, body) = send(app, Method::GET, "/open/1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Connection error"));
    }

    #[tokio::test]
    async fn test_init_write_failure_is_500_and_link_closed() {
        let mock = MockConnector::new().failing_write(0);
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, _) = send(app, Method::GET, "/open/1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(mock.frames_written().is_empty());
        assert_eq!(mock.close_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_init_read_still_succeeds() {
        let mock = MockConnector::new().failing_read();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, body) = send(app, Method::GET, "/open/3").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].get("init_response").is_none());
        assert_eq!(mock.frames_written()[1], open_frame(3));
    }

    #[tokio::test]
    async fn test_panic_in_handler_becomes_500() {
        let resolver: Arc<dyn DeviceResolver> =
            Arc::new(|| -> Result<Vec<String>> { panic!("resolver exploded") });
        let mock = MockConnector::new();
        let app = app_with(resolver, &mock);

        let (status, body) = send(app, Method::GET, "/open/1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let mock = MockConnector::new();
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        let (status, body) = send(app, Method::GET, "/close/1").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert!(mock.events().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_error_is_500() {
        let resolver: Arc<dyn DeviceResolver> = Arc::new(|| -> Result<Vec<String>> {
            Err(EltisError::Config("Invalid device pattern".to_string()))
        });
        let mock = MockConnector::new();
        let app = app_with(resolver, &mock);

        let (status, _) = send(app, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(mock.events().is_empty());
    }

    #[tokio::test]
    async fn test_client_going_away_still_opens_door() {
        let mock = MockConnector::new().with_byte_delay(Duration::from_millis(2));
        let app = app_with(fixed_devices(&["/dev/ttyACM0"]), &mock);

        // The request future is dropped while the Init frame is being written
        let outcome =
            tokio::time::timeout(Duration::from_millis(40), send(app, Method::GET, "/open/2")).await;
        assert!(outcome.is_err());

        for _ in 0..500 {
            if mock.close_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut expected = Command::Init.encode().as_bytes().to_vec();
        expected.extend(open_frame(2));
        assert_eq!(mock.wire(), expected);
        assert_eq!(mock.close_count(), 1);
    }
}
