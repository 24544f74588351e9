//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};

/// bcrypt only keys off the first 72 bytes of input
const MAX_PASSWORD_BYTES: usize = 72;

/// Truncate a password to the bcrypt byte ceiling.
///
/// Applied on both the hashing and verification paths so a long password
/// verifies consistently no matter which call site truncated it.
fn truncate_password(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hash a password using bcrypt (random per-call salt).
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(truncate_password(password), DEFAULT_COST)
}

/// Verify a password against a stored hash.
///
/// Returns `false` for any mismatch, including a malformed stored hash.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(truncate_password(password), hashed).unwrap_or(false)
}
