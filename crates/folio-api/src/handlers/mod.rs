//! HTTP handlers for folio-api.
//!
//! Reads are public; every handler that changes content takes a
//! [`RequireAdmin`](crate::auth::RequireAdmin) extractor.

pub mod content;
pub mod data;
pub mod gallery;
pub mod order;
pub mod system;
pub mod upload;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// `ETag` value for a stored version.
pub(crate) fn etag(version: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("\"{}\"", version)).ok()
}

/// Version named by `If-Match`. `*` and an absent header both mean "any".
pub(crate) fn if_match(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::IF_MATCH)?.to_str().ok()?.trim();
    if raw.is_empty() || raw == "*" {
        return None;
    }
    let raw = raw.strip_prefix("W/").unwrap_or(raw);
    Some(raw.trim_matches('"').to_string())
}

/// `{success:true, message}` with the new version as `ETag`.
pub(crate) fn saved(message: String, version: &str) -> Response {
    let body = Json(json!({ "success": true, "message": message }));
    match etag(version) {
        Some(tag) => ([(header::ETAG, tag)], body).into_response(),
        None => body.into_response(),
    }
}

/// JSON body with the document version as `ETag`.
pub(crate) fn versioned_json(value: Value, version: &str) -> Response {
    match etag(version) {
        Some(tag) => ([(header::ETAG, tag)], Json(value)).into_response(),
        None => Json(value).into_response(),
    }
}
