//! Thumbnail generation for uploaded photos.
//!
//! Walks `<persist>/img` and writes a same-named thumbnail under
//! `<persist>/thumbs`, fitted inside a square while keeping the aspect ratio.

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::defaults::{IMAGE_DIR, THUMB_DIR};
use folio_core::logging::subsystem;
use folio_core::Result;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::{debug, trace, warn};

/// Counts reported after a thumbnail run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Files seen in the image directory (sidecars included).
    pub total: usize,
}

/// Sidecar files dropped next to downloads by Windows and some file managers.
fn is_sidecar(name: &str) -> bool {
    name.contains("Zone.Identifier") || name.contains(".attrs")
}

/// Generate missing thumbnails for every photo under `persist_root`.
pub fn generate_thumbnails(persist_root: &Path, size: u32) -> Result<ThumbnailReport> {
    let img_dir = persist_root.join(IMAGE_DIR);
    let thumb_dir = persist_root.join(THUMB_DIR);
    fs::create_dir_all(&thumb_dir)?;

    let mut report = ThumbnailReport::default();
    let mut entries: Vec<PathBuf> = fs::read_dir(&img_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for src in entries {
        report.total += 1;
        let Some(name) = src.file_name().and_then(|n| n.to_str()) else {
            report.skipped += 1;
            continue;
        };
        if is_sidecar(name) || !src.is_file() {
            report.skipped += 1;
            continue;
        }

        let dst = thumb_dir.join(name);
        if dst.exists() {
            trace!(subsystem = subsystem::THUMBS, file = name, "Thumbnail exists");
            report.skipped += 1;
            continue;
        }

        match write_thumbnail(&src, &dst, size) {
            Ok(()) => {
                debug!(subsystem = subsystem::THUMBS, file = name, "Thumbnail created");
                report.created += 1;
            }
            Err(e) => {
                warn!(subsystem = subsystem::THUMBS, file = name, error = %e, "Thumbnail failed");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Resize one image into `dst`, fitted inside `size`×`size`.
pub fn write_thumbnail(src: &Path, dst: &Path, size: u32) -> image::ImageResult<()> {
    let img = image::open(src)?;
    let thumbnail = img.resize(size, size, FilterType::Lanczos3);

    let format = ImageFormat::from_path(dst)?;
    // JPEG has no alpha channel
    let thumbnail = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(thumbnail.to_rgb8())
    } else {
        thumbnail
    };
    thumbnail.save_with_format(dst, format)
}
