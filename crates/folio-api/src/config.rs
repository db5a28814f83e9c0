//! Server configuration read from the environment.
//!
//! Environment variables:
//!   PORT, HOST                  - bind address (default 0.0.0.0:3000)
//!   PERSIST_PATH                - root for data/, img/, icons/, thumbs/, .sessions/ (default ".")
//!   SITE_ROOT                   - static site directory (default ".")
//!   SESSION_SECRET              - cookie signing key (random per process when unset)
//!   ADMIN_PASSWORD_HASH         - Argon2 PHC string for the admin password
//!   NODE_ENV                    - "production" marks cookies Secure
//!   CESIUM_ION_TOKEN            - handed to the globe viewer
//!   COUNTRIES_GEOJSON           - country boundaries (default <PERSIST_PATH>/data/countries.geojson)
//!   SESSION_TTL_SECS            - session lifetime (default 86400)
//!   LOGIN_RATE_LIMIT_PER_MINUTE - login attempts per minute, 0 disables (default 0)

use std::path::PathBuf;
use std::str::FromStr;

use folio_core::defaults;
use folio_core::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub persist_path: PathBuf,
    pub site_root: PathBuf,
    pub session_secret: String,
    /// True when `SESSION_SECRET` was absent and a throwaway key was generated.
    pub session_secret_generated: bool,
    pub admin_password_hash: Option<String>,
    pub production: bool,
    pub cesium_token: Option<String>,
    pub countries_geojson: PathBuf,
    pub session_ttl_secs: u64,
    pub login_rate_limit_per_minute: u32,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let persist_path = PathBuf::from(get("PERSIST_PATH").unwrap_or_else(|| ".".to_string()));
        let site_root = PathBuf::from(get("SITE_ROOT").unwrap_or_else(|| ".".to_string()));
        let countries_geojson = get("COUNTRIES_GEOJSON")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                persist_path
                    .join(defaults::DATA_DIR)
                    .join(defaults::COUNTRIES_FILE)
            });

        let (session_secret, session_secret_generated) = match get("SESSION_SECRET") {
            Some(secret) => (secret, false),
            None => (folio_crypto::generate_secret(), true),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| defaults::HOST.to_string()),
            port: parse_or("PORT", get("PORT"), defaults::PORT)?,
            persist_path,
            site_root,
            session_secret,
            session_secret_generated,
            admin_password_hash: get("ADMIN_PASSWORD_HASH"),
            production: get("NODE_ENV").as_deref() == Some("production"),
            cesium_token: get("CESIUM_ION_TOKEN"),
            countries_geojson,
            session_ttl_secs: parse_or(
                "SESSION_TTL_SECS",
                get("SESSION_TTL_SECS"),
                defaults::SESSION_TTL_SECS,
            )?,
            login_rate_limit_per_minute: parse_or(
                "LOGIN_RATE_LIMIT_PER_MINUTE",
                get("LOGIN_RATE_LIMIT_PER_MINUTE"),
                defaults::LOGIN_RATE_LIMIT_PER_MINUTE,
            )?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw))),
    }
}
