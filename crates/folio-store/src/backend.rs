//! Storage backend abstraction and the filesystem implementation.
//!
//! Paths are relative to the backend root (the persist directory). Writes
//! are atomic: data goes to `<file>.tmp`, is fsynced, then renamed over the
//! target, so a concurrent reader sees either the old or the new file.

use async_trait::async_trait;
use folio_core::logging::subsystem;
use folio_core::{Error, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path, replacing any existing file.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path. A missing file is `Error::NotFound`.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Copy `from` over `to`.
    async fn copy(&self, from: &str, to: &str) -> Result<()>;

    /// Delete data at the specified path. Deleting a missing file succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// List file names directly inside a directory (empty when it does not exist).
    async fn list(&self, dir: &str) -> Result<Vec<String>>;
}

/// Filesystem storage backend rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve a relative path, refusing anything that could escape the root.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(Error::Validation(format!("Invalid storage path: {}", path)));
        }
        Ok(self.base_path.join(relative))
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn not_found(path: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(path.to_string())
    } else {
        Error::Io(e)
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(
            subsystem = subsystem::STORE,
            path = %full_path.display(),
            size_bytes = data.len(),
            "file_storage: write"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        let temp_path = temp_path_for(&full_path);
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: File::create failed");
            e
        })?;
        file.write_all(data).await.map_err(|e| {
            warn!(error = %e, "file_storage: write_all failed");
            e
        })?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        // rw-r--r--, never executable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(full_path).await.map_err(|e| not_found(path, e))
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let src = self.full_path(from)?;
        let dst = self.full_path(to)?;
        fs::copy(src, dst).await.map_err(|e| not_found(from, e))?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        match fs::remove_file(full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let full_path = self.full_path(dir)?;
        let mut entries = match fs::read_dir(&full_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Compute BLAKE3 hash of data with "blake3:" prefix.
///
/// Returns a string in the format: `blake3:{64-char-hex}`
pub fn compute_content_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    format!("blake3:{}", hash.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("data/books.json", b"[]").await.unwrap();

        assert_eq!(backend.read("data/books.json").await.unwrap(), b"[]");
        assert!(!dir.path().join("data/books.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let err = backend.read("data/nope.json").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        for bad in ["../x", "/etc/passwd", "data/../../x", ""] {
            let err = backend.write(bad, b"x").await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "path {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_copy_and_delete() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.write("a.json", b"1").await.unwrap();

        backend.copy("a.json", "a.json.bak").await.unwrap();
        assert_eq!(backend.read("a.json.bak").await.unwrap(), b"1");

        backend.delete("a.json").await.unwrap();
        assert!(!dir.path().join("a.json").exists());
        backend.delete("a.json").await.unwrap();

        let err = backend.copy("a.json", "b.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_files() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        assert!(backend.list("img").await.unwrap().is_empty());

        backend.write("img/b.jpg", b"b").await.unwrap();
        backend.write("img/a.jpg", b"a").await.unwrap();
        backend.write("img/nested/c.jpg", b"c").await.unwrap();

        assert_eq!(backend.list("img").await.unwrap(), vec!["a.jpg", "b.jpg"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_files_are_not_executable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.write("f.json", b"{}").await.unwrap();

        let mode = std::fs::metadata(dir.path().join("f.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_content_hash_format() {
        let hash = compute_content_hash(b"hello");
        assert!(hash.starts_with("blake3:"));
        assert_eq!(hash.len(), "blake3:".len() + 64);
        assert_eq!(hash, compute_content_hash(b"hello"));
        assert_ne!(hash, compute_content_hash(b"hello!"));
    }
}
