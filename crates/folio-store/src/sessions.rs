//! Disk-backed admin sessions: one `.sessions/<id>.json` file per session.

use chrono::{DateTime, Duration, Utc};
use folio_core::defaults::{ADMIN_USERNAME, SESSION_DIR};
use folio_core::logging::subsystem;
use folio_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;

/// Session ids are 32 random bytes, hex encoded.
pub const SESSION_ID_LEN: usize = 64;

/// What a session file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A fresh authenticated admin session.
    pub fn admin(ttl: Duration) -> Self {
        Self {
            is_authenticated: true,
            username: ADMIN_USERNAME.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// True for ids this store could have issued.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub struct FileSessionStore {
    backend: Box<dyn StorageBackend>,
}

impl FileSessionStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    fn path(id: &str) -> Result<String> {
        if !is_valid_session_id(id) {
            return Err(Error::Validation("Malformed session id.".to_string()));
        }
        Ok(format!("{}/{}.json", SESSION_DIR, id))
    }

    pub async fn save(&self, id: &str, session: &Session) -> Result<()> {
        let path = Self::path(id)?;
        let bytes = serde_json::to_vec_pretty(session)?;
        self.backend.write(&path, &bytes).await?;
        debug!(subsystem = subsystem::SESSIONS, expires_at = %session.expires_at, "Session saved");
        Ok(())
    }

    /// Load a live session. Unknown, malformed, corrupt or expired sessions
    /// yield `None`; expired and corrupt files are removed on the way.
    pub async fn load(&self, id: &str) -> Result<Option<Session>> {
        let Ok(path) = Self::path(id) else {
            return Ok(None);
        };
        let bytes = match self.backend.read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let session: Session = match serde_json::from_slice(&bytes) {
            Ok(session) => session,
            Err(e) => {
                warn!(subsystem = subsystem::SESSIONS, path = %path, error = %e, "Discarding corrupt session file");
                self.backend.delete(&path).await?;
                return Ok(None);
            }
        };
        if session.is_expired(Utc::now()) {
            debug!(subsystem = subsystem::SESSIONS, "Session expired");
            self.backend.delete(&path).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Remove a session. Destroying an unknown session succeeds.
    pub async fn destroy(&self, id: &str) -> Result<()> {
        match Self::path(id) {
            Ok(path) => self.backend.delete(&path).await,
            Err(_) => Ok(()),
        }
    }

    /// Delete every expired or unreadable session file. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut removed = 0;
        for name in self.backend.list(SESSION_DIR).await? {
            let Some(id) = name.strip_suffix(".json") else {
                continue;
            };
            let Ok(path) = Self::path(id) else {
                continue;
            };
            let stale = match self.backend.read(&path).await {
                Ok(bytes) => serde_json::from_slice::<Session>(&bytes)
                    .map(|s| s.is_expired(now))
                    .unwrap_or(true),
                Err(e) if e.is_not_found() => false,
                Err(e) => return Err(e),
            };
            if stale {
                self.backend.delete(&path).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(subsystem = subsystem::SESSIONS, record_count = removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FilesystemBackend;
    use tempfile::TempDir;

    fn id(c: char) -> String {
        std::iter::repeat(c).take(SESSION_ID_LEN).collect()
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id(&id('a')));
        assert!(!is_valid_session_id(&id('A')));
        assert!(!is_valid_session_id("abc"));
        assert!(!is_valid_session_id(&format!("../{}", &id('0')[3..])));
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = Session::admin(Duration::hours(1));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["isAuthenticated"], true);
        assert_eq!(value["username"], "admin");
        assert!(value["expiresAt"].is_string());
    }

    #[tokio::test]
    async fn test_save_load_destroy() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(FilesystemBackend::new(dir.path()));
        let sid = id('1');

        store.save(&sid, &Session::admin(Duration::hours(1))).await.unwrap();
        assert!(dir.path().join(".sessions").join(format!("{}.json", sid)).exists());

        let loaded = store.load(&sid).await.unwrap().unwrap();
        assert!(loaded.is_authenticated);

        store.destroy(&sid).await.unwrap();
        assert!(store.load(&sid).await.unwrap().is_none());
        store.destroy(&sid).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_removed_on_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(FilesystemBackend::new(dir.path()));
        let sid = id('2');

        store.save(&sid, &Session::admin(Duration::seconds(-5))).await.unwrap();
        assert!(store.load(&sid).await.unwrap().is_none());
        assert!(!dir.path().join(".sessions").join(format!("{}.json", sid)).exists());
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids_load_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(FilesystemBackend::new(dir.path()));
        assert!(store.load(&id('3')).await.unwrap().is_none());
        assert!(store.load("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(FilesystemBackend::new(dir.path()));
        store.save(&id('4'), &Session::admin(Duration::hours(1))).await.unwrap();
        store.save(&id('5'), &Session::admin(Duration::seconds(-1))).await.unwrap();
        std::fs::write(dir.path().join(".sessions").join(format!("{}.json", id('6'))), "{").unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert!(store.load(&id('4')).await.unwrap().is_some());
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_without_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(FilesystemBackend::new(dir.path()));
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }
}
