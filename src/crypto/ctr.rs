//! AES-256-CTR with an all-zero IV.
//!
//! Scrypt password hashes are the signer key run through this transform with
//! the password-derived key. Changing the counter layout or the IV invalidates
//! every stored hash, so it must only change together with a data migration.

use aes::Aes256;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};

use super::KEY_LEN;
use crate::error::{Result, SecurityError};

type Aes256Ctr = Ctr128BE<Aes256>;

const ZERO_IV: [u8; 16] = [0u8; 16];

pub fn apply_zero_iv_keystream(key: &[u8; KEY_LEN], data: &[u8]) -> Result<Vec<u8>> {
    let mut cipher = Aes256Ctr::new_from_slices(key, &ZERO_IV)
        .map_err(|e| SecurityError::KeyDerivationError(format!("AES-CTR setup: {e}")))?;

    let mut buf = data.to_vec();
    cipher.apply_keystream(&mut buf);
    Ok(buf)
}
