//! Structured logging field names and subsystem values for folio.
//!
//! `tracing` macros need field names as identifiers, so the names below are
//! the contract every crate follows when it writes `subsystem = ...`,
//! `section = ...` and friends. The subsystem *values* are used directly.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed with a 5xx, operator attention needed |
//! | WARN  | Recoverable issue (backup failed, lookup disabled, auth rejected) |
//! | INFO  | Lifecycle events and completed writes |
//! | DEBUG | Reads, decision points, config choices |
//! | TRACE | Per-record iteration (country assignment, thumbnail walk) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID of the HTTP request (UUIDv7, `x-request-id`).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event. Values: see [`subsystem`].
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name ("read", "write", "reorder", "login", ...).
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Section key being read or written (`books`, `research/journal`, ...).
pub const SECTION: &str = "section";

/// Filesystem path touched by the operation.
pub const FILE_PATH: &str = "path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of records in a document.
pub const RECORD_COUNT: &str = "record_count";

/// Byte length of a written file or upload.
pub const SIZE_BYTES: &str = "size_bytes";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Values for the [`SUBSYSTEM`] field.
pub mod subsystem {
    pub const API: &str = "api";
    pub const AUTH: &str = "auth";
    pub const STORE: &str = "store";
    pub const SESSIONS: &str = "sessions";
    pub const GEO: &str = "geo";
    pub const THUMBS: &str = "thumbs";
}
