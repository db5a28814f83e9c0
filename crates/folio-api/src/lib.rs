//! # folio-api
//!
//! HTTP server for the folio portfolio site: the JSON content API, admin
//! login, uploads, the photo gallery endpoint and the static site itself.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod static_files;
pub mod telemetry;

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_core::defaults::JSON_BODY_LIMIT_BYTES;
use folio_core::logging::subsystem;
use folio_core::{CountryIndex, Error, Result};
use folio_crypto::CookieSigner;
use folio_store::{ContentStore, FileSessionStore, FilesystemBackend};
use governor::{Quota, RateLimiter};
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

pub use config::Config;
pub use error::ApiError;

use handlers::{content, data, gallery, order, system, upload};

/// Login limiter (direct quota, a single admin has nothing to key on).
pub type LoginRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    /// Raw file access under the persist directory (uploads).
    pub files: FilesystemBackend,
    pub sessions: Arc<FileSessionStore>,
    pub signer: Arc<CookieSigner>,
    pub countries: Arc<CountryIndex>,
    pub config: Arc<Config>,
    /// None when `LOGIN_RATE_LIMIT_PER_MINUTE` is 0.
    pub login_limiter: Option<Arc<LoginRateLimiter>>,
}

impl AppState {
    pub fn new(config: Config, countries: CountryIndex) -> Result<Self> {
        let signer = CookieSigner::new(&config.session_secret)
            .map_err(|e| Error::Config(format!("SESSION_SECRET: {}", e)))?;

        if config.session_secret_generated {
            warn!(
                subsystem = subsystem::AUTH,
                "SESSION_SECRET is not set; using a random key, sessions will not survive a restart"
            );
        }
        match &config.admin_password_hash {
            None => warn!(
                subsystem = subsystem::AUTH,
                "ADMIN_PASSWORD_HASH is not set; admin login is disabled"
            ),
            Some(hash) => {
                if let Err(e) = folio_crypto::validate_hash(hash) {
                    warn!(subsystem = subsystem::AUTH, error = %e, "ADMIN_PASSWORD_HASH is not a valid Argon2 hash");
                }
            }
        }

        let login_limiter = NonZeroU32::new(config.login_rate_limit_per_minute)
            .map(|per_minute| Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))));

        let files = FilesystemBackend::new(&config.persist_path);
        Ok(Self {
            store: Arc::new(ContentStore::new(files.clone())),
            sessions: Arc::new(FileSessionStore::new(files.clone())),
            files,
            signer: Arc::new(signer),
            countries: Arc::new(countries),
            config: Arc::new(config),
            login_limiter,
        })
    }
}

/// Load country boundaries. A missing file disables country lookup.
pub fn load_country_index(path: &Path) -> Result<CountryIndex> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                subsystem = subsystem::GEO,
                path = %path.display(),
                "Country boundaries not found; photo country lookup disabled"
            );
            return Ok(CountryIndex::empty());
        }
        Err(e) => return Err(e.into()),
    };
    let index = CountryIndex::from_geojson(&text)?;
    info!(
        subsystem = subsystem::GEO,
        path = %path.display(),
        record_count = index.len(),
        "Loaded country boundaries"
    );
    Ok(index)
}

/// Periodically delete expired session files.
pub fn spawn_session_sweeper(sessions: Arc<FileSessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.purge_expired().await {
                error!(subsystem = subsystem::SESSIONS, error = %e, "Session sweep failed");
            }
        }
    })
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id: HeaderValue = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Request span carrying the correlation id set by [`MakeRequestUuidV7`].
fn request_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    error!(subsystem = subsystem::API, "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "success": false, "error": "Internal server error." })),
    )
        .into_response()
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Content documents
        .route(
            "/api/content/homepage",
            get(content::read_homepage).post(content::save_homepage),
        )
        .route(
            "/api/content/contactBanner",
            get(content::read_contact_banner).post(content::save_contact_banner),
        )
        // Sections (`POST .../:section/order` shares the wildcard route)
        .route(
            "/api/data/*section",
            get(data::read_section).post(order::reorder_section),
        )
        .route("/api/save/*section", post(data::save_section))
        .route("/api/images/reorder", post(order::reorder_photos))
        .route("/api/gallery/:index", get(gallery::open_gallery))
        // Uploads
        .route("/api/upload/image", post(upload::upload_image))
        .route("/api/upload/icon", post(upload::upload_icon))
        // Auth
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/auth/status", get(auth::status))
        // Runtime configuration
        .route("/api/config/cesium-token", get(system::cesium_token))
        .route("/health", get(system::health_check));

    static_files::mount(api, &state.config)
        .layer(axum::middleware::from_fn(static_files::reject_hidden_paths))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT_BYTES))
        .with_state(state)
}
