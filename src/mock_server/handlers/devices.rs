//! Device endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::{error_response, list_response, preflight, ListQuery};
use crate::mock_server::state::MockState;

fn device_not_found(id: u64) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No device found with id: {id}"),
    )
}

/// GET /device/devices
pub async fn list_devices(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut state = state.write().await;

    if let Some(response) = preflight(&mut state, &headers, "/device/devices") {
        return response;
    }

    list_response(&state.list_devices(), &query)
}

/// GET /device/devices/{id}
pub async fn get_device(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/device/devices/{id}");
    let mut state = state.write().await;

    if let Some(response) = preflight(&mut state, &headers, &path) {
        return response;
    }

    match state.get_device(id) {
        Some(device) => (StatusCode::OK, Json(device.clone())).into_response(),
        None => device_not_found(id),
    }
}

/// GET /device/devices/{id}/devicedatasources
pub async fn list_device_datasources(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let path = format!("/device/devices/{id}/devicedatasources");
    let mut state = state.write().await;

    if let Some(response) = preflight(&mut state, &headers, &path) {
        return response;
    }
    if state.get_device(id).is_none() {
        return device_not_found(id);
    }

    let items = state.device_datasources.get(&id).cloned().unwrap_or_default();
    list_response(&items, &query)
}

/// GET /device/devices/{id}/devicedatasources/{hdsid}/instances
pub async fn list_instances(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, hdsid)): Path<(u64, u64)>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let path = format!("/device/devices/{id}/devicedatasources/{hdsid}/instances");
    let mut state = state.write().await;

    if let Some(response) = preflight(&mut state, &headers, &path) {
        return response;
    }
    if state.get_device(id).is_none() {
        return device_not_found(id);
    }

    let items = state.instances.get(&(id, hdsid)).cloned().unwrap_or_default();
    list_response(&items, &query)
}
