//! Helpers for exercising the router without hardware

use crate::api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use eltis_core::{DeviceConfig, Result};
use eltis_hardware::{DeviceResolver, DoorController, MockConnector};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Resolver returning a fixed candidate list
pub(crate) fn fixed_devices(paths: &[&str]) -> Arc<dyn DeviceResolver> {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    Arc::new(move || -> Result<Vec<String>> { Ok(paths.clone()) })
}

/// Router backed by the given resolver and mock link
pub(crate) fn app_with(resolver: Arc<dyn DeviceResolver>, mock: &MockConnector) -> Router {
    let device = DeviceConfig::default();
    let controller = DoorController::new(resolver, Arc::new(mock.clone()), device.link_settings());
    create_router(AppState::new(controller, device, true))
}

/// Send one request and decode the JSON body
pub(crate) async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}
