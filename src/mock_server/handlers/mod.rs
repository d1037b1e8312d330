//! HTTP request handlers for the mock server.

pub mod devices;
pub mod modules;

pub use devices::*;
pub use modules::*;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth;
use crate::config::Credentials;
use crate::mock_server::state::{MockState, ScriptedFailure};

/// Largest page the real API serves.
const MAX_PAGE_SIZE: usize = 1000;
/// Page size when the request names none.
const DEFAULT_PAGE_SIZE: usize = 50;

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub size: Option<usize>,
    pub offset: Option<usize>,
    pub filter: Option<String>,
    pub fields: Option<String>,
    #[allow(dead_code)] // Sent by clients; JSON is the only format served
    pub format: Option<String>,
}

/// Record the request, then serve a scripted failure or reject a bad
/// signature. `None` means the handler should answer normally.
pub(crate) fn preflight(state: &mut MockState, headers: &HeaderMap, path: &str) -> Option<Response> {
    if let Some(failure) = state.next_failure(path) {
        return Some(failure_response(failure));
    }

    if let Some(ref credentials) = state.credentials {
        if !signature_valid(credentials, headers, path) {
            return Some(error_response(
                StatusCode::UNAUTHORIZED,
                "Authentication failed",
            ));
        }
    }

    None
}

fn signature_valid(credentials: &Credentials, headers: &HeaderMap, path: &str) -> bool {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let Some((id, sig, epoch)) = auth::parse_authorization(value) else {
        return false;
    };

    id == credentials.access_id
        && sig == auth::signature(&credentials.access_key, "GET", path, "", epoch)
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "errorMessage": message,
            "errorCode": status.as_u16(),
        })),
    )
        .into_response()
}

fn failure_response(failure: ScriptedFailure) -> Response {
    let status =
        StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = error_response(status, "Scripted failure");

    if let Some(retry_after) = failure.retry_after {
        if let Ok(value) = HeaderValue::from_str(&retry_after) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}

/// Apply filter, paging and field projection, and wrap in a v3 envelope.
pub(crate) fn list_response(items: &[Value], query: &ListQuery) -> Response {
    let matching: Vec<&Value> = items
        .iter()
        .filter(|item| matches_filter(item, query.filter.as_deref()))
        .collect();

    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let page: Vec<Value> = matching
        .iter()
        .skip(offset)
        .take(size)
        .map(|item| project(item, query.fields.as_deref()))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "items": page,
            "total": matching.len(),
            "searchId": null,
        })),
    )
        .into_response()
}

/// Supports comma-separated `field~"text"` (contains) and `field:"text"`
/// (equals) clauses, all of which must match.
fn matches_filter(item: &Value, filter: Option<&str>) -> bool {
    let Some(filter) = filter.filter(|f| !f.trim().is_empty()) else {
        return true;
    };

    filter.split(',').all(|clause| {
        let (field, wanted, contains) = match clause.split_once('~') {
            Some((f, v)) => (f, v, true),
            None => match clause.split_once(':') {
                Some((f, v)) => (f, v, false),
                None => return true,
            },
        };
        let wanted = wanted.trim().trim_matches('"');
        let actual = match item.get(field.trim()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => return false,
            Some(other) => other.to_string(),
        };

        if contains {
            actual.to_lowercase().contains(&wanted.to_lowercase())
        } else {
            actual == wanted
        }
    })
}

fn project(item: &Value, fields: Option<&str>) -> Value {
    let (Some(fields), Value::Object(map)) = (fields, item) else {
        return item.clone();
    };

    let wanted: Vec<&str> = fields.split(',').map(str::trim).collect();
    let projected: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| wanted.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(projected)
}
