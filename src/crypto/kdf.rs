use pbkdf2::pbkdf2_hmac;
use scrypt::Params;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, PBKDF2_ROUNDS, SCRYPT_PARALLELISM};
use crate::error::{Result, SecurityError};

/// Scrypt cost parameters. Parallelism and output length are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    /// block size `r`
    rounds: u32,
    /// log2 of the CPU/memory cost `N`
    memory_cost: u8,
}

impl ScryptParams {
    pub fn new(rounds: u32, memory_cost: u8) -> Result<Self> {
        let params = Self {
            rounds,
            memory_cost,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn memory_cost(&self) -> u8 {
        self.memory_cost
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds < 1 {
            return Err(SecurityError::InvalidConfig("scrypt rounds must be >= 1".into()));
        }
        if self.memory_cost < 1 {
            return Err(SecurityError::InvalidConfig(
                "scrypt memory cost must be >= 1".into(),
            ));
        }
        self.to_scrypt().map(|_| ())
    }

    fn to_scrypt(self) -> Result<Params> {
        Params::new(self.memory_cost, self.rounds, SCRYPT_PARALLELISM, KEY_LEN)
            .map_err(|e| SecurityError::InvalidConfig(format!("scrypt parameters: {e}")))
    }
}

/// Derive the AES-GCM key for passphrase encryption.
///
/// The timestamp is appended to the passphrase in decimal form, so the same
/// timestamp must be supplied again to decrypt.
pub fn derive_pbkdf2_key(
    passphrase: &str,
    timestamp: i64,
    salt: &[u8],
) -> Zeroizing<[u8; KEY_LEN]> {
    let material = Zeroizing::new(format!("{passphrase}{timestamp}"));

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(material.as_bytes(), salt, PBKDF2_ROUNDS, &mut key[..]);
    key
}

pub fn derive_scrypt_key(
    password: &[u8],
    salt: &[u8],
    params: ScryptParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = params.to_scrypt()?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password, salt, &params, &mut key[..])
        .map_err(|e| SecurityError::KeyDerivationError(format!("scrypt: {e}")))?;

    Ok(key)
}
