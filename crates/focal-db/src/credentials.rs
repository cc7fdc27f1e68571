//! Credential primitives: password hashing and access token digests.
//!
//! Passwords are stored as Argon2id PHC strings. Access tokens are
//! opaque random strings handed to the client once; the database keeps
//! only their SHA-256 digest.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use rand::Rng;
use sha2::{Digest, Sha256};

use focal_core::{Error, Result};

/// Prefix identifying focal access tokens.
pub const ACCESS_TOKEN_PREFIX: &str = "fc_at_";

/// Random characters following the prefix.
const TOKEN_RANDOM_LEN: usize = 43;

/// Hash a password with Argon2id, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// An unparseable stored hash verifies as false rather than erroring,
/// so a corrupted row behaves like a wrong password.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate a fresh opaque access token.
pub fn generate_access_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let random: String = (0..TOKEN_RANDOM_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!("{}{}", ACCESS_TOKEN_PREFIX, random)
}

/// SHA-256 digest of a token, hex encoded.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
