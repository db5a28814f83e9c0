//! Admin password hashing with Argon2id PHC strings.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Hash a password into a PHC string (`$argon2id$v=19$...`) suitable for
/// `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> CryptoResult<String> {
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }
    let password = Zeroizing::new(password.as_bytes().to_vec());
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(&password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hashing(e.to_string()))
}

/// Check a password against a PHC string.
///
/// A wrong password is `Ok(false)`; a hash that cannot be parsed is an error.
pub fn verify_password(password: &str, phc: &str) -> CryptoResult<bool> {
    let parsed =
        PasswordHash::new(phc.trim()).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CryptoError::InvalidHash(e.to_string())),
    }
}

/// Check that a configured hash is an Argon2 PHC string, without verifying anything.
pub fn validate_hash(phc: &str) -> CryptoResult<()> {
    let parsed =
        PasswordHash::new(phc.trim()).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;
    if !parsed.algorithm.as_str().starts_with("argon2") {
        return Err(CryptoError::InvalidHash(format!(
            "unsupported algorithm '{}'",
            parsed.algorithm
        )));
    }
    Ok(())
}
