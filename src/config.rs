//! Scrypt password-hash configuration.
//!
//! The four values must match whatever produced the stored hashes, otherwise
//! every existing password fails verification.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::crypto::ScryptParams;
use crate::error::SecurityError;

pub const ENV_SIGNER_KEY: &str = "SECURITY_BASE64_SIGNER_KEY";
pub const ENV_SALT_SEPARATOR: &str = "SECURITY_BASE64_SALT_SEPARATOR";
pub const ENV_ROUNDS: &str = "SECURITY_SCRYPT_ROUNDS";
pub const ENV_MEMORY_COST: &str = "SECURITY_SCRYPT_MEMORY_COST";

/// Decoded signer key length; scrypt hashes have the same length.
pub const SIGNER_KEY_LEN: usize = 64;

/// At-rest form, as supplied by a config file or the environment.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScryptConfig {
    pub base64_signer_key: String,
    pub base64_salt_separator: String,
    pub rounds: u32,
    pub memory_cost: u8,
}

impl fmt::Debug for RawScryptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawScryptConfig")
            .field("base64_signer_key", &"<redacted>")
            .field("base64_salt_separator", &"<redacted>")
            .field("rounds", &self.rounds)
            .field("memory_cost", &self.memory_cost)
            .finish()
    }
}

/// Decoded and validated scrypt configuration.
#[derive(Clone)]
pub struct ScryptConfig {
    signer_key: Zeroizing<Vec<u8>>,
    salt_separator: Zeroizing<Vec<u8>>,
    params: ScryptParams,
}

impl ScryptConfig {
    pub fn new(
        base64_signer_key: &str,
        base64_salt_separator: &str,
        rounds: u32,
        memory_cost: u8,
    ) -> Result<Self, SecurityError> {
        let signer_key = decode_secret("signer key", base64_signer_key)?;
        if signer_key.len() != SIGNER_KEY_LEN {
            return Err(SecurityError::InvalidConfig(format!(
                "signer key must be {SIGNER_KEY_LEN} bytes, got {}",
                signer_key.len()
            )));
        }
        let salt_separator = decode_secret("salt separator", base64_salt_separator)?;
        let params = ScryptParams::new(rounds, memory_cost)?;

        Ok(Self {
            signer_key,
            salt_separator,
            params,
        })
    }

    pub fn signer_key(&self) -> &[u8] {
        &self.signer_key
    }

    pub fn salt_separator(&self) -> &[u8] {
        &self.salt_separator
    }

    pub fn params(&self) -> ScryptParams {
        self.params
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawScryptConfig =
            serde_json::from_str(json).context("failed to parse scrypt config JSON")?;
        Self::try_from(raw).context("invalid scrypt config")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Builds the config from `SECURITY_*` key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

        let lookup = |key: &str| {
            vars.get(key)
                .cloned()
                .with_context(|| format!("missing environment variable {key}"))
        };

        let raw = RawScryptConfig {
            base64_signer_key: lookup(ENV_SIGNER_KEY)?,
            base64_salt_separator: lookup(ENV_SALT_SEPARATOR)?,
            rounds: lookup(ENV_ROUNDS)?
                .trim()
                .parse()
                .with_context(|| format!("{ENV_ROUNDS} must be an unsigned integer"))?,
            memory_cost: lookup(ENV_MEMORY_COST)?
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MEMORY_COST} must be an integer in 1..=63"))?,
        };

        Self::try_from(raw).context("invalid scrypt config")
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Reads a dotenv file; variables already set in the process environment
    /// take precedence over the file.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to open env file {}", path.display()))?
        {
            let (key, value) =
                item.with_context(|| format!("failed to parse env file {}", path.display()))?;
            vars.insert(key, value);
        }
        vars.extend(std::env::vars());

        Self::from_vars(vars)
    }
}

impl TryFrom<RawScryptConfig> for ScryptConfig {
    type Error = SecurityError;

    fn try_from(raw: RawScryptConfig) -> Result<Self, Self::Error> {
        let config = Self::new(
            &raw.base64_signer_key,
            &raw.base64_salt_separator,
            raw.rounds,
            raw.memory_cost,
        )?;
        tracing::debug!(
            rounds = raw.rounds,
            memory_cost = raw.memory_cost,
            "loaded scrypt configuration"
        );
        Ok(config)
    }
}

impl fmt::Debug for ScryptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScryptConfig")
            .field("signer_key", &"<redacted>")
            .field("salt_separator", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

fn decode_secret(name: &str, value: &str) -> Result<Zeroizing<Vec<u8>>, SecurityError> {
    STANDARD
        .decode(value.trim())
        .map(Zeroizing::new)
        .map_err(|e| SecurityError::InvalidConfig(format!("{name} is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNER_KEY: &str = "MoaHZJjRSE9Ktj6HnIkoldV+BmXpD7YVboHgJOY4SDnUNiNMTUILxlsY4igO3Uzx/n/VwFju9IC4fQfgDy7LwQ==";

    #[test]
    fn decodes_secrets_once() {
        let config = ScryptConfig::new(SIGNER_KEY, "Bw==", 8, 14).unwrap();

        assert_eq!(config.signer_key().len(), 64);
        assert_eq!(config.salt_separator(), &[0x07]);
        assert_eq!(config.params().rounds(), 8);
        assert_eq!(config.params().memory_cost(), 14);
    }

    #[test]
    fn rejects_bad_base64_and_empty_signer_key() {
        assert!(matches!(
            ScryptConfig::new("not base64!", "Bw==", 8, 14),
            Err(SecurityError::InvalidConfig(_))
        ));
        assert!(matches!(
            ScryptConfig::new("", "Bw==", 8, 14),
            Err(SecurityError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_signer_key_of_wrong_length() {
        let short = STANDARD.encode([1u8; 32]);
        let long = STANDARD.encode([1u8; 65]);

        for key in [short, long] {
            let err = ScryptConfig::new(&key, "Bw==", 8, 14).unwrap_err();
            assert!(err.to_string().contains("must be 64 bytes"));
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ScryptConfig::new(SIGNER_KEY, "Bw==", 8, 14).unwrap();
        let debug = format!("{config:?}");

        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("7"));
    }

    #[test]
    fn loads_from_json() {
        let json = format!(
            r#"{{"base64SignerKey":"{SIGNER_KEY}","base64SaltSeparator":"Bw==","rounds":8,"memoryCost":14}}"#
        );
        let config = ScryptConfig::from_json_str(&json).unwrap();
        assert_eq!(config.params().rounds(), 8);
    }

    #[test]
    fn loads_from_vars() {
        let config = ScryptConfig::from_vars([
            (ENV_SIGNER_KEY, SIGNER_KEY),
            (ENV_SALT_SEPARATOR, "Bw=="),
            (ENV_ROUNDS, "8"),
            (ENV_MEMORY_COST, " 14 "),
        ])
        .unwrap();
        assert_eq!(config.params().memory_cost(), 14);
    }

    #[test]
    fn missing_var_is_reported_by_name() {
        let err = ScryptConfig::from_vars([(ENV_SIGNER_KEY, SIGNER_KEY)]).unwrap_err();
        assert!(err.to_string().contains(ENV_SALT_SEPARATOR));
    }

    #[test]
    fn loads_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            format!(
                "{ENV_SIGNER_KEY}={SIGNER_KEY}\n{ENV_SALT_SEPARATOR}=Bw==\n{ENV_ROUNDS}=8\n{ENV_MEMORY_COST}=14\n"
            ),
        )
        .unwrap();

        let config = ScryptConfig::from_env_file(&path).unwrap();
        assert_eq!(config.signer_key().len(), 64);
    }
}
