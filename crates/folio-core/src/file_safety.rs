//! Upload safety checks for photos and contact icons.
//!
//! Two layers:
//! 1. The client's declared type must be `image/*`
//! 2. Magic bytes must agree (SVG icons, being text, are accepted by extension)

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Extensions written for sniffed raster images, keyed by MIME type.
const RASTER_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/avif", "avif"),
    ("image/heif", "heif"),
];

/// Extensions that are never stored even when the bytes look like an image.
static BLOCKED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "dll", "scr", "com", "msi", "so", "dylib", "jar", "class", "html", "htm", "js",
        "php", "hta", "lnk",
    ]
    .into_iter()
    .collect()
});

/// Where an upload is headed; icons additionally accept SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Icon,
}

impl UploadKind {
    /// Multipart field name carrying the file.
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Image => "uploadedImage",
            UploadKind::Icon => "icon",
        }
    }
}

/// Result of upload validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub allowed: bool,
    pub block_reason: Option<String>,
    pub detected_type: Option<String>,
    /// Extension to store the file under (no leading dot).
    pub extension: Option<String>,
}

impl ValidationResult {
    pub fn allowed(detected: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            allowed: true,
            block_reason: None,
            detected_type: Some(detected.into()),
            extension: Some(extension.into()),
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            block_reason: Some(reason.into()),
            detected_type: None,
            extension: None,
        }
    }
}

/// Validate an uploaded photo or icon.
pub fn validate_upload(
    kind: UploadKind,
    filename: &str,
    claimed: &str,
    data: &[u8],
    max_size_bytes: u64,
) -> ValidationResult {
    if data.is_empty() {
        return ValidationResult::blocked("No file uploaded.");
    }

    if data.len() as u64 > max_size_bytes {
        return ValidationResult::blocked(format!(
            "File too large. Maximum size is {} MB.",
            max_size_bytes / (1024 * 1024)
        ));
    }

    let ext = extension_of(filename);
    if let Some(ext) = ext.as_deref() {
        if BLOCKED_EXTENSIONS.contains(ext) {
            return ValidationResult::blocked(format!("File extension .{} is not allowed.", ext));
        }
    }

    if !claimed.to_ascii_lowercase().starts_with("image/") {
        return ValidationResult::blocked("Invalid file type. Only images are allowed.");
    }

    let detected = detect_content_type(filename, data, claimed);
    if detected == "image/svg+xml" {
        if kind == UploadKind::Icon && looks_like_svg(data) {
            return ValidationResult::allowed(detected, "svg");
        }
        return ValidationResult::blocked("Invalid file type. Only images are allowed.");
    }

    match extension_for_mime(&detected) {
        Some(stored_ext) => ValidationResult::allowed(detected, stored_ext),
        None => ValidationResult::blocked("Invalid file type. Only images are allowed."),
    }
}

/// Detect actual content type from file magic bytes.
///
/// Image magic bytes win; SVG is recognised by extension (an `<?xml` prolog
/// sniffs as `text/xml`); any other claimed image type without matching magic
/// bytes is downgraded to `application/octet-stream`.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: &str) -> String {
    let sniffed = infer::get(data).map(|kind| kind.mime_type());
    if let Some(mime) = sniffed.filter(|m| m.starts_with("image/")) {
        return mime.to_string();
    }

    if extension_of(filename).as_deref() == Some("svg") {
        return "image/svg+xml".to_string();
    }

    if let Some(mime) = sniffed {
        return mime.to_string();
    }

    if claimed.starts_with("image/") {
        return "application/octet-stream".to_string();
    }

    claimed.to_string()
}

/// Stored extension for a sniffed raster MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    RASTER_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

fn extension_of(filename: &str) -> Option<String> {
    let name = sanitize_filename(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    String::from_utf8_lossy(head).to_ascii_lowercase().contains("<svg")
}

/// Sanitize a client-supplied filename (strip path components and control characters).
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }
    sanitized.to_string()
}
