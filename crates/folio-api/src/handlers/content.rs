//! Editable page fragments: the homepage HTML and the contact banner.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::{html, HtmlPage, Section};
use serde_json::Value;

use super::{etag, if_match, saved, versioned_json};
use crate::auth::RequireAdmin;
use crate::error::ApiError;
use crate::AppState;

/// GET /api/content/homepage
pub async fn read_homepage(State(state): State<AppState>) -> Result<Response, ApiError> {
    let document = state.store.read_html(HtmlPage::Homepage).await?;
    let mut response = document.html.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if let Some(tag) = etag(&document.version) {
        headers.insert(header::ETAG, tag);
    }
    Ok(response)
}

/// POST /api/content/homepage `{html}`
pub async fn save_homepage(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let markup = match body.get("html").and_then(Value::as_str) {
        Some(markup) if !markup.trim().is_empty() => markup,
        _ => {
            return Err(ApiError::BadRequest(
                "Invalid input. 'html' must be a non-empty string.".to_string(),
            ))
        }
    };

    let clean = html::sanitize(markup);
    let expected = if_match(&headers);
    let page = HtmlPage::Homepage;
    let outcome = state
        .store
        .write_html(page, &clean, expected.as_deref())
        .await?;
    Ok(saved(
        format!("{} saved successfully.", page.label()),
        &outcome.version,
    ))
}

/// GET /api/content/contactBanner
pub async fn read_contact_banner(State(state): State<AppState>) -> Result<Response, ApiError> {
    let document = state.store.read(Section::ContactBanner).await?;
    Ok(versioned_json(document.value, &document.version))
}

/// POST /api/content/contactBanner `{html?, links, emails?}`
pub async fn save_contact_banner(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut body) = payload?;
    let section = Section::ContactBanner;
    section.validate(&body)?;

    if let Some(Value::String(markup)) = body.get_mut("html") {
        *markup = html::sanitize(markup);
    }

    let expected = if_match(&headers);
    let outcome = state.store.write(section, &body, expected.as_deref()).await?;
    Ok(saved(
        format!("{} saved successfully.", section.label()),
        &outcome.version,
    ))
}
