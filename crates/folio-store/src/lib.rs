//! # folio-store
//!
//! File-backed storage for folio: the content store (one JSON or HTML file
//! per section, `.bak` backups, versioned reads), disk-backed admin sessions
//! and thumbnail generation.

pub mod backend;
pub mod content;
pub mod sessions;
pub mod thumbnails;

pub use backend::{compute_content_hash, FilesystemBackend, StorageBackend};
pub use content::{ContentStore, Document, HtmlDocument, WriteOutcome};
pub use sessions::{is_valid_session_id, FileSessionStore, Session};
pub use thumbnails::{generate_thumbnails, ThumbnailReport};
