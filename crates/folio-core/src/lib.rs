//! # folio-core
//!
//! Core types and content rules for the folio portfolio site.
//!
//! This crate holds everything the store and the HTTP server agree on: the
//! section catalogue, per-section validation, the error taxonomy, country
//! lookup, gallery context linking and upload checks.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod gallery;
pub mod geo;
pub mod html;
pub mod logging;
pub mod models;
pub mod section;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::{detect_content_type, sanitize_filename, validate_upload, UploadKind};
pub use gallery::{build_gallery, Gallery, GalleryContext, GalleryItem};
pub use geo::CountryIndex;
pub use models::{Photo, PhotoOrder, Trip};
pub use section::{HtmlPage, Section, Shape};
