//! LogicModule endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tokio::sync::RwLock;

use super::{error_response, list_response, preflight, ListQuery};
use crate::mock_server::state::MockState;

/// GET /setting/{kind}
pub async fn list_modules(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let path = format!("/setting/{kind}");
    let mut state = state.write().await;

    if let Some(response) = preflight(&mut state, &headers, &path) {
        return response;
    }

    match state.list_modules(&path) {
        Some(items) => list_response(items, &query),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("No such resource: {path}"),
        ),
    }
}
