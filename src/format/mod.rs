//! Text format of passphrase-encrypted values.
//!
//! A token is `hex(salt)-hex(nonce)-hex(ciphertext || tag)`. Stored tokens
//! must be kept byte-for-byte; re-encoding breaks decryption.

use std::fmt;

use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{Result, SecurityError};

/// Segment separator.
pub const SEPARATOR: char = '-';
/// Number of segments in a well-formed token.
pub const SEGMENTS: usize = 3;

/// Parsed encryption token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionToken {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptionToken {
    pub fn new(salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            nonce,
            ciphertext,
        }
    }

    /// Returns the PBKDF2 salt.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Returns the AES-GCM nonce.
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Returns the ciphertext with the GCM tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Parses a token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCiphertext` if the token does not have exactly three
    /// segments or the salt/nonce have the wrong length, and `DecodeError`
    /// if a segment is not valid hex.
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split(SEPARATOR).collect();
        if parts.len() != SEGMENTS {
            return Err(SecurityError::InvalidCiphertext(format!(
                "expected {SEGMENTS} segments, got {}",
                parts.len()
            )));
        }

        let salt = decode_segment("salt", parts[0])?;
        let nonce = decode_segment("nonce", parts[1])?;
        let ciphertext = decode_segment("ciphertext", parts[2])?;

        let salt: [u8; SALT_LEN] = salt.try_into().map_err(|v: Vec<u8>| {
            SecurityError::InvalidCiphertext(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|v: Vec<u8>| {
            SecurityError::InvalidCiphertext(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                v.len()
            ))
        })?;

        Ok(Self::new(salt, nonce, ciphertext))
    }
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>> {
    hex::decode(segment).map_err(|e| SecurityError::DecodeError(format!("{name} segment: {e}")))
}

impl fmt::Display for EncryptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            hex::encode(self.salt),
            hex::encode(self.nonce),
            hex::encode(&self.ciphertext)
        )
    }
}
