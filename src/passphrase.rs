//! Passphrase encryption bound to a timestamp.
//!
//! The key is PBKDF2-HMAC-SHA256 over `passphrase || decimal(timestamp)` with
//! a random 8-byte salt; the payload is sealed with AES-256-GCM.

use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, SALT_LEN};
use crate::error::{Result, SecurityError};
use crate::format::EncryptionToken;

pub fn encrypt(passphrase: &str, timestamp: i64, plaintext: &str) -> Result<String> {
    encrypt_with_rng(crypto::secure_random, passphrase, timestamp, plaintext)
}

/// Same as [`encrypt`], drawing salt and nonce from `fill`.
pub(crate) fn encrypt_with_rng<F>(
    mut fill: F,
    passphrase: &str,
    timestamp: i64,
    plaintext: &str,
) -> Result<String>
where
    F: FnMut(&mut [u8]) -> Result<()>,
{
    let mut salt = [0u8; SALT_LEN];
    fill(&mut salt)?;
    let key = crypto::derive_pbkdf2_key(passphrase, timestamp, &salt);
    let mut nonce = [0u8; NONCE_LEN];
    fill(&mut nonce)?;

    let ciphertext = crypto::encrypt(&key, &nonce, plaintext.as_bytes())?;

    Ok(EncryptionToken::new(salt, nonce, ciphertext).to_string())
}

pub fn decrypt_bytes(passphrase: &str, timestamp: i64, token: &str) -> Result<Zeroizing<Vec<u8>>> {
    let token = EncryptionToken::parse(token)?;
    let key = crypto::derive_pbkdf2_key(passphrase, timestamp, token.salt());
    crypto::decrypt(&key, token.nonce(), token.ciphertext())
}

pub fn decrypt(passphrase: &str, timestamp: i64, token: &str) -> Result<String> {
    let plaintext = decrypt_bytes(passphrase, timestamp, token)?;
    String::from_utf8(plaintext.to_vec())
        .map_err(|_| SecurityError::DecodeError("plaintext is not valid UTF-8".into()))
}
