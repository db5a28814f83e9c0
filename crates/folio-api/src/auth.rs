//! Admin authentication: signed session cookies backed by session files.
//!
//! There is one identity (`admin`). Logging in verifies the password against
//! `ADMIN_PASSWORD_HASH`, discards any previous session and issues a fresh
//! one; the cookie carries `<session id>.<hmac>` so a forged or edited cookie
//! never reaches the session store.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use folio_core::defaults::{ADMIN_USERNAME, SESSION_COOKIE};
use folio_core::logging::subsystem;
use folio_core::Error;
use folio_store::Session;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

const UNAUTHORIZED: &str = "Unauthorized. Please log in.";
const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Value of the session cookie, if the request carries one.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// Session attached to the request, if any.
///
/// Never rejects: a missing, tampered or expired cookie is simply "no session".
#[derive(Debug, Clone)]
pub struct Auth {
    pub session: Option<(String, Session)>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(cookie) = session_cookie(&parts.headers) else {
            return Ok(Auth { session: None });
        };
        let Some(id) = state.signer.verify(cookie) else {
            warn!(subsystem = subsystem::AUTH, "Rejected session cookie with bad signature");
            return Ok(Auth { session: None });
        };
        let session = state.sessions.load(&id).await?;
        Ok(Auth {
            session: session.map(|s| (id, s)),
        })
    }
}

/// Extractor for routes that change content. Rejects with 401.
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;
        match auth.session {
            Some((_, session)) if session.is_authenticated => Ok(RequireAdmin {
                username: session.username,
            }),
            _ => {
                info!(
                    subsystem = subsystem::AUTH,
                    method = %parts.method,
                    uri = %parts.uri,
                    "Unauthenticated write attempt"
                );
                Err(Error::Unauthorized(UNAUTHORIZED.to_string()).into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

fn session_set_cookie(state: &AppState, value: &str, max_age: u64) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, value, max_age
    );
    if state.config.production {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {}", e)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    auth: Auth,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(limiter) = &state.login_limiter {
        if limiter.check().is_err() {
            warn!(subsystem = subsystem::AUTH, "Login rate limit exceeded");
            return Err(ApiError::TooManyRequests(
                "Too many login attempts. Please wait before retrying.".to_string(),
            ));
        }
    }

    let Json(request) = payload?;
    let password = request.password.unwrap_or_default();
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password is required.".to_string()));
    }

    let Some(hash) = state.config.admin_password_hash.clone() else {
        return Err(ApiError::Internal("Server configuration error.".to_string()));
    };

    let username_ok = request
        .username
        .as_deref()
        .map_or(true, |u| u.is_empty() || u == ADMIN_USERNAME);
    // CPU-bound
    let password_ok =
        tokio::task::spawn_blocking(move || folio_crypto::verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("Password check failed: {}", e)))??;

    if !(username_ok && password_ok) {
        warn!(subsystem = subsystem::AUTH, "Failed login attempt");
        return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
    }

    if let Some((old_id, _)) = &auth.session {
        state.sessions.destroy(old_id).await?;
    }

    let id = folio_crypto::generate_session_id();
    let ttl = state.config.session_ttl_secs;
    let session = Session::admin(chrono::Duration::seconds(ttl as i64));
    state.sessions.save(&id, &session).await?;

    let cookie = session_set_cookie(&state, &state.signer.sign(&id), ttl)?;
    info!(subsystem = subsystem::AUTH, username = %session.username, "Admin logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "message": "Login successful." })),
    ))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    if let Some((id, _)) = &auth.session {
        state.sessions.destroy(id).await?;
        info!(subsystem = subsystem::AUTH, "Admin logged out");
    }
    let cookie = session_set_cookie(&state, "", 0)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "message": "Logged out." })),
    ))
}

/// GET /api/auth/status
pub async fn status(auth: Auth) -> impl IntoResponse {
    match auth.session {
        Some((_, session)) if session.is_authenticated => Json(json!({
            "isAuthenticated": true,
            "username": session.username,
        })),
        _ => Json(json!({ "isAuthenticated": false })),
    }
}
