//! File-backed content store.
//!
//! Each section is one JSON file under `data/`. Every write is a
//! full-document replace preceded by a best-effort `.bak` copy. Writers to
//! the same file are serialised by a per-file async mutex; readers never
//! lock because the backend replaces files atomically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use folio_core::defaults::{BACKUP_SUFFIX, DATA_DIR};
use folio_core::logging::subsystem;
use folio_core::{Error, HtmlPage, Photo, PhotoOrder, Result, Section};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::backend::{compute_content_hash, StorageBackend};

/// A parsed document plus the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: Value,
    /// `blake3:<hex>` of the file bytes.
    pub version: String,
}

/// Raw HTML plus its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    pub html: String,
    pub version: String,
}

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Version of the newly written file.
    pub version: String,
    /// Number of records for array documents.
    pub record_count: Option<usize>,
}

pub struct ContentStore {
    backend: Box<dyn StorageBackend>,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            locks: StdMutex::new(HashMap::new()),
        }
    }

    fn data_path(file_name: &str) -> String {
        format!("{}/{}", DATA_DIR, file_name)
    }

    /// Take the single-writer lock for one file.
    async fn lock(&self, path: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks
                .entry(path.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Read and parse a section document.
    pub async fn read(&self, section: Section) -> Result<Document> {
        let path = Self::data_path(section.file_name());
        let bytes = self.backend.read(&path).await.map_err(|e| {
            if e.is_not_found() {
                Error::NotFound(format!("Data file not found: {}", section.file_name()))
            } else {
                e
            }
        })?;
        let value = parse_document(section, &bytes)?;
        debug!(
            subsystem = subsystem::STORE,
            op = "read",
            section = %section,
            record_count = value.as_array().map(Vec::len),
            "Read content file"
        );
        Ok(Document {
            value,
            version: compute_content_hash(&bytes),
        })
    }

    /// Validate and replace a section document.
    ///
    /// With `expected_version`, the write only happens when the file on disk
    /// still has that version; otherwise it fails with `Error::Conflict`.
    pub async fn write(
        &self,
        section: Section,
        value: &Value,
        expected_version: Option<&str>,
    ) -> Result<WriteOutcome> {
        section.validate(value)?;
        let path = Self::data_path(section.file_name());
        let _guard = self.lock(&path).await;
        self.check_version(&path, expected_version).await?;
        self.replace_json(section, &path, value).await
    }

    /// Read the homepage (or another HTML page) verbatim.
    pub async fn read_html(&self, page: HtmlPage) -> Result<HtmlDocument> {
        let path = Self::data_path(page.file_name());
        let bytes = self.backend.read(&path).await.map_err(|e| {
            if e.is_not_found() {
                Error::NotFound(format!("{} file not found.", page.label()))
            } else {
                e
            }
        })?;
        let version = compute_content_hash(&bytes);
        let html = String::from_utf8(bytes)
            .map_err(|_| Error::Parse(format!("{} is not valid UTF-8.", page.file_name())))?;
        Ok(HtmlDocument { html, version })
    }

    /// Back up and replace an HTML page. The caller sanitises the markup.
    pub async fn write_html(
        &self,
        page: HtmlPage,
        html: &str,
        expected_version: Option<&str>,
    ) -> Result<WriteOutcome> {
        let path = Self::data_path(page.file_name());
        let _guard = self.lock(&path).await;
        self.check_version(&path, expected_version).await?;
        self.backup(&path).await;
        self.backend.write(&path, html.as_bytes()).await?;
        info!(
            subsystem = subsystem::STORE,
            op = "write",
            path = %path,
            size_bytes = html.len(),
            "Saved HTML page"
        );
        Ok(WriteOutcome {
            version: compute_content_hash(html.as_bytes()),
            record_count: None,
        })
    }

    /// Assign `order` by position in `ids` and persist.
    ///
    /// Every id must exist exactly once in the request; otherwise nothing is
    /// written (not even a backup). Records not named in `ids` keep their
    /// relative order after the listed ones, and `order` keeps counting.
    pub async fn reorder(
        &self,
        section: Section,
        ids: &[String],
        expected_version: Option<&str>,
    ) -> Result<WriteOutcome> {
        let path = Self::data_path(section.file_name());
        let _guard = self.lock(&path).await;
        let current = self.read_for_update(section, &path, expected_version).await?;
        let records = into_array(section, current.value)?;
        let reordered = reorder_records(records, ids)?;
        self.replace_json(section, &path, &Value::Array(reordered))
            .await
    }

    /// Set `sortIndex` on photos matched by `imageFull` (or `thumbnail`).
    ///
    /// Unknown slugs reject the whole request with nothing written.
    pub async fn reorder_photos(
        &self,
        orders: &[PhotoOrder],
        expected_version: Option<&str>,
    ) -> Result<WriteOutcome> {
        let section = Section::Images;
        let path = Self::data_path(section.file_name());
        let _guard = self.lock(&path).await;
        let current = self.read_for_update(section, &path, expected_version).await?;
        let mut photos = into_array(section, current.value)?;
        apply_photo_orders(&mut photos, orders)?;
        self.replace_json(section, &path, &Value::Array(photos))
            .await
    }

    async fn read_for_update(
        &self,
        section: Section,
        path: &str,
        expected_version: Option<&str>,
    ) -> Result<Document> {
        let document = self.read(section).await?;
        if let Some(expected) = expected_version {
            if expected != document.version {
                return Err(conflict(path));
            }
        }
        Ok(document)
    }

    async fn check_version(&self, path: &str, expected_version: Option<&str>) -> Result<()> {
        let Some(expected) = expected_version else {
            return Ok(());
        };
        let current = match self.backend.read(path).await {
            Ok(bytes) => Some(compute_content_hash(&bytes)),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        if current.as_deref() == Some(expected) {
            Ok(())
        } else {
            Err(conflict(path))
        }
    }

    /// Copy the current file to `<file>.bak`. Never fails the write.
    async fn backup(&self, path: &str) {
        let backup_path = format!("{}{}", path, BACKUP_SUFFIX);
        match self.backend.copy(path, &backup_path).await {
            Ok(()) => debug!(subsystem = subsystem::STORE, path = %backup_path, "Backup created"),
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(
                subsystem = subsystem::STORE,
                path = %path,
                error = %e,
                "Could not create backup"
            ),
        }
    }

    async fn replace_json(
        &self,
        section: Section,
        path: &str,
        value: &Value,
    ) -> Result<WriteOutcome> {
        let start = Instant::now();
        let bytes = serde_json::to_vec_pretty(value)?;
        self.backup(path).await;
        self.backend.write(path, &bytes).await?;

        let record_count = value.as_array().map(Vec::len);
        info!(
            subsystem = subsystem::STORE,
            op = "write",
            section = %section,
            record_count,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Saved content file"
        );
        Ok(WriteOutcome {
            version: compute_content_hash(&bytes),
            record_count,
        })
    }
}

fn conflict(path: &str) -> Error {
    Error::Conflict(format!(
        "{} was modified since it was read. Reload and try again.",
        path.rsplit('/').next().unwrap_or(path)
    ))
}

fn parse_document(section: Section, bytes: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(bytes).map_err(|_| {
        Error::Parse(format!(
            "Failed to parse data file. Invalid JSON format in {}.",
            section.file_name()
        ))
    })?;
    section.check_shape(&value)?;
    Ok(value)
}

fn into_array(section: Section, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(records) => Ok(records),
        _ => Err(Error::Parse(format!(
            "Invalid format in {}: expected a JSON array.",
            section.file_name()
        ))),
    }
}

/// Record id as a string key. Numeric ids match their decimal form.
fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pure reorder step: listed records first with `order = position`, then the rest.
fn reorder_records(records: Vec<Value>, ids: &[String]) -> Result<Vec<Value>> {
    let mut seen = HashSet::with_capacity(ids.len());
    let duplicates: Vec<&str> = ids
        .iter()
        .filter(|id| !seen.insert(id.as_str()))
        .map(String::as_str)
        .collect();
    if !duplicates.is_empty() {
        return Err(Error::Validation(format!(
            "Duplicate ids in request: {}",
            duplicates.join(", ")
        )));
    }

    let mut by_id: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if let Some(id) = record_id(record) {
            by_id.entry(id).or_insert(i);
        }
    }

    let missing: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !by_id.contains_key(*id))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "Some ids do not exist: {}",
            missing.join(", ")
        )));
    }

    let positions: Vec<usize> = ids.iter().map(|id| by_id[id.as_str()]).collect();
    let listed: HashSet<usize> = positions.iter().copied().collect();

    let mut slots: Vec<Option<Value>> = records.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    for pos in positions {
        if let Some(record) = slots[pos].take() {
            out.push(record);
        }
    }
    for (i, slot) in slots.into_iter().enumerate() {
        if listed.contains(&i) {
            continue;
        }
        if let Some(record) = slot {
            out.push(record);
        }
    }

    for (order, record) in out.iter_mut().enumerate() {
        if let Some(obj) = record.as_object_mut() {
            obj.insert("order".to_string(), Value::from(order));
        }
    }
    Ok(out)
}

fn apply_photo_orders(photos: &mut [Value], orders: &[PhotoOrder]) -> Result<()> {
    let slugs: Vec<Option<String>> = photos
        .iter()
        .map(|p| {
            serde_json::from_value::<Photo>(p.clone())
                .ok()
                .and_then(|photo| photo.slug().map(str::to_string))
        })
        .collect();

    let known: HashSet<&str> = slugs.iter().flatten().map(String::as_str).collect();
    let missing: Vec<&str> = orders
        .iter()
        .map(|o| o.slug.as_str())
        .filter(|slug| !known.contains(slug))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "Some photos do not exist: {}",
            missing.join(", ")
        )));
    }

    for order in orders {
        for (photo, slug) in photos.iter_mut().zip(&slugs) {
            if slug.as_deref() == Some(order.slug.as_str()) {
                if let Some(obj) = photo.as_object_mut() {
                    obj.insert("sortIndex".to_string(), Value::from(order.idx));
                }
            }
        }
    }
    Ok(())
}
