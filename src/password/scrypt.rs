use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use crate::config::ScryptConfig;
use crate::crypto::{apply_zero_iv_keystream, bytes_equal, derive_scrypt_key, secure_random};
use crate::error::{Result, SecurityError};

/// Length of salts produced by [`generate_salt`].
pub const SALT_LEN: usize = 16;

/// Hashes `password` with an already decoded per-user salt.
///
/// The scrypt salt is `salt || salt_separator`; the derived key encrypts the
/// signer key with AES-256-CTR under a zero IV. The result is base64.
pub fn hash(config: &ScryptConfig, salt: &[u8], password: &str) -> Result<String> {
    let mut effective_salt = Zeroizing::new(Vec::with_capacity(
        salt.len() + config.salt_separator().len(),
    ));
    effective_salt.extend_from_slice(salt);
    effective_salt.extend_from_slice(config.salt_separator());

    let key = derive_scrypt_key(password.as_bytes(), &effective_salt, config.params())?;
    let ciphertext = apply_zero_iv_keystream(&key, config.signer_key())?;

    Ok(STANDARD.encode(ciphertext))
}

/// Compares two base64 scrypt hashes by their decoded bytes.
pub fn hashes_equal(computed: &str, stored: &str) -> Result<bool> {
    let computed = decode("computed hash", computed)?;
    let stored = decode("stored hash", stored)?;
    Ok(bytes_equal(&computed, &stored))
}

pub fn decode(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| SecurityError::DecodeError(format!("{name}: {e}")))
}

/// Generates a random base64 salt for a new scrypt hash.
pub fn generate_salt() -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(STANDARD.encode(salt))
}
