//! Section documents: public reads and authenticated full-document saves.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use folio_core::logging::subsystem;
use folio_core::Section;
use serde_json::Value;
use tracing::info;

use super::{if_match, saved, versioned_json};
use crate::auth::RequireAdmin;
use crate::error::ApiError;
use crate::AppState;

pub(crate) fn parse_section(key: &str) -> Result<Section, ApiError> {
    Section::from_key(key)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown section: {}", key.trim_matches('/'))))
}

/// GET /api/data/*section
pub async fn read_section(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let section = parse_section(&key)?;
    let document = state.store.read(section).await?;
    Ok(versioned_json(document.value, &document.version))
}

/// POST /api/save/*section
///
/// Photos without a country get one from their coordinates before the
/// document is written.
pub async fn save_section(
    State(state): State<AppState>,
    Path(key): Path<String>,
    _admin: RequireAdmin,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let section = parse_section(&key)?;
    let Json(mut value) = payload?;
    section.validate(&value)?;

    if section == Section::Images {
        let assigned = state.countries.assign_countries(&mut value);
        if assigned > 0 {
            info!(subsystem = subsystem::GEO, record_count = assigned, "Assigned countries to photos");
        }
    }

    let expected = if_match(&headers);
    let outcome = state.store.write(section, &value, expected.as_deref()).await?;
    Ok(saved(
        format!("{} data saved successfully.", section.label()),
        &outcome.version,
    ))
}
