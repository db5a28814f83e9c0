//! Centralized default constants for folio.
//!
//! Every crate and binary references these values instead of defining its own
//! magic numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP port when `PORT` is unset.
pub const PORT: u16 = 3000;

/// Default bind host when `HOST` is unset.
pub const HOST: &str = "0.0.0.0";

/// Maximum accepted JSON request body (markdown-heavy project details fit easily).
pub const JSON_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// PERSISTED LAYOUT
// =============================================================================

/// Directory (under the persist root) holding the JSON/HTML content files.
pub const DATA_DIR: &str = "data";

/// Directory (under the persist root) receiving uploaded photos.
pub const IMAGE_DIR: &str = "img";

/// Directory (under the persist root) receiving uploaded contact icons.
pub const ICON_DIR: &str = "icons";

/// Directory (under the persist root) holding generated thumbnails.
pub const THUMB_DIR: &str = "thumbs";

/// Directory (under the persist root) holding session files.
pub const SESSION_DIR: &str = ".sessions";

/// Country boundary file name inside the data directory.
pub const COUNTRIES_FILE: &str = "countries.geojson";

/// Suffix appended to a content file to form its backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

// =============================================================================
// SESSIONS & AUTH
// =============================================================================

/// Session lifetime in seconds (one day).
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 24;

/// How often expired session files are swept, in seconds.
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "folio.sid";

/// The single admin identity.
pub const ADMIN_USERNAME: &str = "admin";

/// Login attempts allowed per minute (0 disables the limiter).
pub const LOGIN_RATE_LIMIT_PER_MINUTE: u32 = 0;

// =============================================================================
// UPLOADS & THUMBNAILS
// =============================================================================

/// Maximum upload size for photos and icons.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Thumbnails are fitted inside a square of this many pixels.
pub const THUMBNAIL_SIZE: u32 = 96;
