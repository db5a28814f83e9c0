//! # folio-crypto
//!
//! Credentials for the folio admin surface.
//!
//! - **Password hashing**: Argon2id PHC strings (`ADMIN_PASSWORD_HASH`)
//! - **Session ids**: 32 random bytes, hex encoded
//! - **Cookie signing**: HMAC-SHA256 over the session id (`SESSION_SECRET`)
//!
//! ## Example
//!
//! ```rust
//! use folio_crypto::{hash_password, verify_password, CookieSigner, generate_session_id};
//!
//! let phc = hash_password("open sesame").unwrap();
//! assert!(verify_password("open sesame", &phc).unwrap());
//!
//! let signer = CookieSigner::new("a long random secret").unwrap();
//! let id = generate_session_id();
//! let cookie = signer.sign(&id);
//! assert_eq!(signer.verify(&cookie), Some(id));
//! ```

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{hash_password, validate_hash, verify_password};
pub use token::{generate_secret, generate_session_id, CookieSigner};
