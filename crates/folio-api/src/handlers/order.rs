//! Record ordering: research/projects `order` fields and photo `sortIndex`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use folio_core::{PhotoOrder, Section};
use serde_json::Value;

use super::{if_match, saved};
use crate::auth::RequireAdmin;
use crate::error::ApiError;
use crate::AppState;

/// Section named by `<key>/order`.
fn order_section(path: &str) -> Result<Section, ApiError> {
    let path = path.trim_matches('/');
    let Some(key) = path.strip_suffix("/order") else {
        return Err(ApiError::Core(folio_core::Error::NotFound(format!(
            "No route for /api/data/{}",
            path
        ))));
    };
    Section::from_order_key(key)
        .ok_or_else(|| ApiError::BadRequest(format!("Section '{}' cannot be reordered.", key)))
}

fn id_list(value: Value) -> Result<Vec<String>, ApiError> {
    let invalid = || ApiError::BadRequest("Request body must be an array of ids.".to_string());
    let Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(id) => Ok(id),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(invalid()),
        })
        .collect()
}

/// POST /api/data/:section/order
pub async fn reorder_section(
    State(state): State<AppState>,
    Path(path): Path<String>,
    _admin: RequireAdmin,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let section = order_section(&path)?;
    let Json(body) = payload?;
    let ids = id_list(body)?;

    let expected = if_match(&headers);
    let outcome = state.store.reorder(section, &ids, expected.as_deref()).await?;
    Ok(saved(
        format!("{} order saved successfully.", section.label()),
        &outcome.version,
    ))
}

/// POST /api/images/reorder
pub async fn reorder_photos(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    headers: HeaderMap,
    payload: Result<Json<Vec<PhotoOrder>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(orders) = payload?;
    let expected = if_match(&headers);
    let outcome = state.store.reorder_photos(&orders, expected.as_deref()).await?;
    Ok(saved("Photo order saved successfully.".to_string(), &outcome.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_section_paths() {
        assert_eq!(order_section("projects/order").unwrap(), Section::Projects);
        assert_eq!(order_section("/journal/order").unwrap(), Section::ResearchJournal);
        assert!(matches!(order_section("books/order"), Err(ApiError::BadRequest(_))));
        assert!(matches!(order_section("projects"), Err(ApiError::Core(_))));
    }

    #[test]
    fn test_id_list_accepts_strings_and_numbers() {
        assert_eq!(id_list(json!(["a", "b"])).unwrap(), vec!["a", "b"]);
        assert_eq!(id_list(json!(["a", 7])).unwrap(), vec!["a", "7"]);
        assert!(id_list(json!(["a", null])).is_err());
        assert!(id_list(json!(["a", {"id": "b"}])).is_err());
        assert!(id_list(json!({"ids": ["a"]})).is_err());
    }
}
