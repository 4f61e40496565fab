use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::bytes_equal;
use crate::error::{Result, SecurityError};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `password` keyed with `secret_key`, as 64 lowercase hex chars.
///
/// Deterministic: the output is a keyed fingerprint, not a salted hash.
pub fn hash(secret_key: &str, password: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| SecurityError::KeyDerivationError(format!("HMAC key setup: {e}")))?;
    mac.update(password.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recomputes the fingerprint and compares it with `stored_hash` in constant time.
pub fn verify(secret_key: &str, stored_hash: &str, password: &str) -> Result<bool> {
    let computed = hash(secret_key, password)?;
    Ok(bytes_equal(computed.as_bytes(), stored_hash.as_bytes()))
}
