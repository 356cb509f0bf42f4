//! API module for the door server
//!
//! Contains the HTTP API implementation with Axum router and handlers.

pub(crate) mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use eltis_core::DeviceConfig;
use eltis_hardware::DoorController;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use self::error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub(crate) struct AppState {
    /// Door controller, owner of the exclusivity guard
    pub controller: Arc<DoorController>,
    /// Device configuration the controller was built from
    pub device: Arc<DeviceConfig>,
    /// Whether the in-memory link replaces the serial port
    pub mock: bool,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(controller: DoorController, device: DeviceConfig, mock: bool) -> Self {
        Self {
            controller: Arc::new(controller),
            device: Arc::new(device),
            mock,
            start_time: Instant::now(),
        }
    }
}

/// Create the main API router with all endpoints
pub(crate) fn create_router(state: AppState) -> Router {
    info!("Setting up API router...");

    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(cors::Any);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(DefaultBodyLimit::max(64 * 1024));

    Router::new()
        // Door endpoints
        .route(
            "/",
            get(handlers::door::open_default).post(handlers::door::open_default),
        )
        .route(
            "/open/:id",
            get(handlers::door::open_door).post(handlers::door::open_door),
        )
        // System info endpoint
        .route("/api/v0/info", get(handlers::info::get_info))
        .fallback(not_found)
        .layer(middleware_stack)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("No such endpoint")
}

/// Turn a handler panic into a plain 500 response
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    ApiError::internal_error("Internal server error").into_response()
}

/// Error handling utilities
pub(crate) mod error {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use eltis_core::api::ApiResponse;
    use eltis_core::EltisError;

    use tracing::error;

    /// Custom error type for API responses
    #[derive(Debug)]
    pub struct ApiError {
        pub status_code: StatusCode,
        pub message: String,
    }

    impl ApiError {
        /// Create a new API error
        pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
            Self {
                status_code,
                message: message.into(),
            }
        }

        /// Create a bad request error
        pub fn bad_request(message: impl Into<String>) -> Self {
            Self::new(StatusCode::BAD_REQUEST, message)
        }

        /// Create a not found error
        pub fn not_found(message: impl Into<String>) -> Self {
            Self::new(StatusCode::NOT_FOUND, message)
        }

        /// Create an internal server error
        pub fn internal_error(message: impl Into<String>) -> Self {
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            error!("API Error {}: {}", self.status_code, self.message);

            let response: ApiResponse<()> =
                ApiResponse::error(self.status_code.as_u16(), self.message);

            (self.status_code, Json(response)).into_response()
        }
    }

    /// Convert EltisError to ApiError
    ///
    /// Device and link failures are server-side faults and map to 500.
    impl From<EltisError> for ApiError {
        fn from(err: EltisError) -> Self {
            match err {
                EltisError::InvalidInput(msg) => Self::bad_request(msg),
                _ => Self::internal_error(err.to_string()),
            }
        }
    }

}
