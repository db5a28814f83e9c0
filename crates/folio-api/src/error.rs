//! HTTP error type. Every failure leaves the server as `{success:false, error}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::logging::subsystem;
use folio_crypto::CryptoError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] folio_core::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Failed to read upload: {}", err.body_text()))
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use folio_core::Error;
        match self {
            ApiError::Core(err) => match err {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::Validation(_) => StatusCode::BAD_REQUEST,
                Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                Error::Conflict(_) => StatusCode::CONFLICT,
                Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
                Error::Parse(_) | Error::Config(_) | Error::Internal(_) | Error::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message, without the taxonomy prefix.
    pub fn message(&self) -> String {
        use folio_core::Error;
        match self {
            ApiError::Core(err) => match err {
                Error::NotFound(m)
                | Error::Parse(m)
                | Error::Validation(m)
                | Error::Unauthorized(m)
                | Error::Conflict(m)
                | Error::Internal(m) => m.clone(),
                Error::Config(_) => "Server configuration error.".to_string(),
                Error::Io(_) => "Failed to access content files.".to_string(),
            },
            ApiError::BadRequest(m)
            | ApiError::TooManyRequests(m)
            | ApiError::Internal(m) => m.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(subsystem = subsystem::API, status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(subsystem = subsystem::API, status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "error": self.message(),
        }));
        (status, body).into_response()
    }
}
