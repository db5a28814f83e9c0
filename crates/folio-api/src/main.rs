//! folio-api - HTTP server for the folio portfolio site

use std::net::SocketAddr;
use std::time::Duration;

use folio_api::telemetry::{self, LogOptions};
use folio_api::{build_router, load_country_index, spawn_session_sweeper, AppState, Config};
use folio_core::defaults::SESSION_SWEEP_INTERVAL_SECS;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_options = LogOptions::from_env();
    let _log_guard = telemetry::init(&log_options);
    info!(
        log_format = ?log_options.format,
        log_file = %log_options
            .file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(stdout)".to_string()),
        "Logging initialized"
    );

    let config = Config::from_env()?;
    info!(
        persist_path = %config.persist_path.display(),
        site_root = %config.site_root.display(),
        production = config.production,
        session_ttl_secs = config.session_ttl_secs,
        login_rate_limit_per_minute = config.login_rate_limit_per_minute,
        "Configuration loaded"
    );

    let countries = load_country_index(&config.countries_geojson)?;
    let addr: SocketAddr = config.bind_address().parse()?;

    let state = AppState::new(config, countries)?;
    spawn_session_sweeper(
        state.sessions.clone(),
        Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS),
    );

    let app = build_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
