//! Photo and icon uploads.
//!
//! Files are checked by declared type and by magic bytes, then stored under a
//! server-chosen name so nothing the client sends ends up in a path.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use folio_core::defaults::{ICON_DIR, IMAGE_DIR, MAX_UPLOAD_BYTES};
use folio_core::logging::subsystem;
use folio_core::{validate_upload, UploadKind};
use folio_store::StorageBackend;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::RequireAdmin;
use crate::error::ApiError;
use crate::AppState;

/// POST /api/upload/image (multipart field `uploadedImage`)
pub async fn upload_image(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    store_upload(&state, UploadKind::Image, multipart).await
}

/// POST /api/upload/icon (multipart field `icon`)
pub async fn upload_icon(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    store_upload(&state, UploadKind::Icon, multipart).await
}

/// `upload-<unix millis>-<random>.<ext>`
fn stored_name(extension: &str) -> String {
    format!(
        "upload-{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>() % 1_000_000_000,
        extension
    )
}

async fn store_upload(
    state: &AppState,
    kind: UploadKind,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(kind.field_name()) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            upload = Some((filename, content_type, data));
            break;
        }
    }

    let Some((filename, content_type, data)) = upload else {
        return Err(ApiError::BadRequest("No file uploaded.".to_string()));
    };

    let checked = validate_upload(kind, &filename, &content_type, &data, MAX_UPLOAD_BYTES);
    let extension = match (checked.allowed, checked.extension) {
        (true, Some(extension)) => extension,
        _ => {
            let reason = checked
                .block_reason
                .unwrap_or_else(|| "Invalid file type. Only images are allowed.".to_string());
            warn!(subsystem = subsystem::API, filename = %filename, reason = %reason, "Upload rejected");
            return Err(ApiError::BadRequest(reason));
        }
    };

    let dir = match kind {
        UploadKind::Image => IMAGE_DIR,
        UploadKind::Icon => ICON_DIR,
    };
    let name = stored_name(&extension);
    state
        .files
        .write(&format!("{}/{}", dir, name), &data)
        .await?;

    info!(
        subsystem = subsystem::API,
        path = %format!("{}/{}", dir, name),
        size_bytes = data.len(),
        detected_type = checked.detected_type.as_deref().unwrap_or(""),
        "Stored upload"
    );
    Ok(Json(json!({
        "success": true,
        "filename": name,
        "path": format!("/{}/{}", dir, name),
    })))
}
