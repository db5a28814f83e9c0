//! Session ids and signed session cookies.
//!
//! A cookie value is `<id>.<mac>` where `mac` is the hex HMAC-SHA256 of the
//! id under the server's session secret.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

/// Random bytes in a session id (hex doubles the length).
pub const SESSION_ID_BYTES: usize = 32;

/// Random bytes in a generated session secret.
pub const SECRET_BYTES: usize = 32;

/// Generate a fresh session id: 64 lowercase hex characters.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a random secret for processes started without `SESSION_SECRET`.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Signs and verifies session cookie values.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CookieSigner {
    pub fn new(secret: &str) -> CryptoResult<Self> {
        if secret.is_empty() {
            return Err(CryptoError::InvalidKey("session secret is empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// `<id>.<hex mac>`
    pub fn sign(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        format!("{}.{}", id, hex::encode(mac.finalize().into_bytes()))
    }

    /// Return the id when the signature checks out. Comparison is constant time.
    pub fn verify(&self, cookie: &str) -> Option<String> {
        let (id, signature) = cookie.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id.to_string())
    }
}
