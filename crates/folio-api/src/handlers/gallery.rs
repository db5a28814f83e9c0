use axum::extract::{Path, Query, State};
use axum::Json;
use folio_core::{build_gallery, Gallery, GalleryContext, Section, Trip};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub context: Option<String>,
}

/// GET /api/gallery/:index?context=trip|country
pub async fn open_gallery(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Gallery>, ApiError> {
    let clicked: usize = index
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid photo index: {}", index)))?;
    let initial = match query.context.as_deref() {
        None | Some("") => GalleryContext::default(),
        Some(raw) => raw.parse()?,
    };

    let photos = state.store.read(Section::Images).await?.value;
    let photos = photos.as_array().cloned().unwrap_or_default();
    let trips = load_trips(&state).await?;

    Ok(Json(build_gallery(&photos, &trips, clicked, initial)?))
}

/// Trips are optional; a site without `trips.json` shows trip ids instead of names.
async fn load_trips(state: &AppState) -> Result<Vec<Trip>, ApiError> {
    let value = match state.store.read(Section::Trips).await {
        Ok(document) => document.value,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let trips = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(trips)
}
