//! Password hashing and passphrase encryption shared by backend services.
//!
//! [`Security`] bundles four capabilities:
//!
//! - passphrase encryption bound to a timestamp (PBKDF2 + AES-256-GCM),
//! - HMAC-SHA256 password fingerprints,
//! - scrypt password hashes compatible with the legacy identity provider,
//! - constant-time byte comparison.
//!
//! Producing operations come in two flavours. The `try_*` methods return
//! [`Result`] and should be preferred. The plain methods keep the historical
//! behaviour of reporting internal failures to the [`ErrorReporter`] and
//! returning a best-effort value (an empty string) instead of an error.

pub mod config;
pub mod crypto;
mod error;
pub mod format;
pub mod passphrase;
pub mod password;
mod report;

pub use crate::config::{RawScryptConfig, ScryptConfig};
pub use crate::crypto::{ScryptParams, bytes_equal};
pub use crate::error::{Result, SecurityError};
pub use crate::format::EncryptionToken;
pub use crate::report::{ErrorReporter, TracingReporter};

use zeroize::Zeroizing;

pub struct Security<R = TracingReporter> {
    scrypt: ScryptConfig,
    reporter: R,
}

impl Security<TracingReporter> {
    pub fn new(scrypt: ScryptConfig) -> Self {
        Self::with_reporter(scrypt, TracingReporter)
    }
}

impl<R: ErrorReporter> Security<R> {
    pub fn with_reporter(scrypt: ScryptConfig, reporter: R) -> Self {
        Self { scrypt, reporter }
    }

    pub fn scrypt_config(&self) -> &ScryptConfig {
        &self.scrypt
    }

    /// Encrypts `plaintext` under `passphrase` and `timestamp`.
    ///
    /// The same timestamp is required to decrypt.
    pub fn try_encrypt(&self, passphrase: &str, timestamp: i64, plaintext: &str) -> Result<String> {
        crate::passphrase::encrypt(passphrase, timestamp, plaintext)
    }

    /// Like [`Security::try_encrypt`], but reports failures and returns an
    /// empty string.
    pub fn encrypt(&self, passphrase: &str, timestamp: i64, plaintext: &str) -> String {
        self.encrypt_with_rng(crypto::secure_random, passphrase, timestamp, plaintext)
    }

    fn encrypt_with_rng<F>(
        &self,
        fill: F,
        passphrase: &str,
        timestamp: i64,
        plaintext: &str,
    ) -> String
    where
        F: FnMut(&mut [u8]) -> Result<()>,
    {
        crate::passphrase::encrypt_with_rng(fill, passphrase, timestamp, plaintext)
            .unwrap_or_else(|e| {
                self.reporter.error("encrypt", &e.to_string());
                String::new()
            })
    }

    /// Decrypts a token produced by [`Security::try_encrypt`].
    ///
    /// A wrong passphrase, a wrong timestamp and a tampered token all fail
    /// with [`SecurityError::AuthenticationFailure`].
    pub fn decrypt(&self, passphrase: &str, timestamp: i64, token: &str) -> Result<String> {
        crate::passphrase::decrypt(passphrase, timestamp, token)
    }

    pub fn decrypt_bytes(
        &self,
        passphrase: &str,
        timestamp: i64,
        token: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        crate::passphrase::decrypt_bytes(passphrase, timestamp, token)
    }

    pub fn try_hash_password(&self, secret_key: &str, password: &str) -> Result<String> {
        crate::password::hmac::hash(secret_key, password)
    }

    pub fn hash_password(&self, secret_key: &str, password: &str) -> String {
        self.try_hash_password(secret_key, password)
            .unwrap_or_else(|e| {
                self.reporter.error("hash_password", &e.to_string());
                String::new()
            })
    }

    pub fn compare_hash_password(&self, secret_key: &str, stored_hash: &str, password: &str) -> bool {
        crate::password::hmac::verify(secret_key, stored_hash, password).unwrap_or_else(|e| {
            self.reporter.error("compare_hash_password", &e.to_string());
            false
        })
    }

    /// Scrypt hash of `password` with the base64 per-user `salt`.
    pub fn try_scrypt_password(&self, salt: &str, password: &str) -> Result<String> {
        let salt = Zeroizing::new(crate::password::scrypt::decode("salt", salt)?);
        crate::password::scrypt::hash(&self.scrypt, &salt, password)
    }

    /// Like [`Security::try_scrypt_password`], except an undecodable salt is
    /// reported and hashed as empty, and any other failure is reported and
    /// yields an empty string.
    pub fn scrypt_password(&self, salt: &str, password: &str) -> String {
        let salt = self.decode_salt_or_empty("scrypt_password", salt);

        crate::password::scrypt::hash(&self.scrypt, &salt, password).unwrap_or_else(|e| {
            self.reporter.error("scrypt_password", &e.to_string());
            String::new()
        })
    }

    /// Recomputes the scrypt hash the way [`Security::scrypt_password`] does
    /// and compares decoded bytes in constant time.
    ///
    /// Every failure resolves to `false`; the cause is only reported.
    pub fn compare_scrypt_password(&self, stored_hash: &str, salt: &str, password: &str) -> bool {
        let salt = self.decode_salt_or_empty("compare_scrypt_password", salt);
        let outcome = crate::password::scrypt::hash(&self.scrypt, &salt, password)
            .and_then(|computed| crate::password::scrypt::hashes_equal(&computed, stored_hash));

        outcome.unwrap_or_else(|e| {
            self.reporter.error("compare_scrypt_password", &e.to_string());
            false
        })
    }

    /// Random base64 salt suitable for [`Security::try_scrypt_password`].
    pub fn generate_scrypt_salt(&self) -> Result<String> {
        crate::password::generate_scrypt_salt()
    }

    fn decode_salt_or_empty(&self, context: &str, salt: &str) -> Zeroizing<Vec<u8>> {
        let salt = crate::password::scrypt::decode("salt", salt).unwrap_or_else(|e| {
            self.reporter.error(context, &e.to_string());
            Vec::new()
        });
        Zeroizing::new(salt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;

    use super::{EncryptionToken, ErrorReporter, ScryptConfig, Security, SecurityError, crypto};

    const SIGNER_KEY: &str = "MoaHZJjRSE9Ktj6HnIkoldV+BmXpD7YVboHgJOY4SDnUNiNMTUILxlsY4igO3Uzx/n/VwFju9IC4fQfgDy7LwQ==";
    const SALT: &str = "ekr/rlgB6tovww==";
    const PASSWORD: &str = "D0wn5izeDd3v5";
    const SCRYPT_VECTOR: &str = "8WTYvjqmK1naiAZnAFthrXzvdiW2SKFW6RWCsFe8bhhCr7PZ9EUr9WgZOQSYNMoSRujIlaNluzLl7u268P1FJQ==";
    const HMAC_VECTOR: &str = "93435c1a22a97eb31d56ee721b650d90cb17daf535b8f8d4727035e1cbf6821c";

    #[derive(Default)]
    struct RecordingReporter {
        entries: Mutex<Vec<(String, String)>>,
    }

    impl RecordingReporter {
        fn contexts(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|(c, _)| c.clone())
                .collect()
        }
    }

    impl ErrorReporter for RecordingReporter {
        fn error(&self, context: &str, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((context.to_string(), message.to_string()));
        }
    }

    fn security() -> Security {
        Security::new(ScryptConfig::new(SIGNER_KEY, "Bw==", 8, 14).unwrap())
    }

    fn recording() -> (Security<Arc<RecordingReporter>>, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let security = Security::with_reporter(
            ScryptConfig::new(SIGNER_KEY, "Bw==", 8, 14).unwrap(),
            Arc::clone(&reporter),
        );
        (security, reporter)
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let s = security();
        let token = s.try_encrypt("passphrase", 1_700_000_000, "secret data").unwrap();

        assert_eq!(
            s.decrypt("passphrase", 1_700_000_000, &token).unwrap(),
            "secret data"
        );
    }

    #[test]
    fn empty_plaintext_and_passphrase_roundtrip() {
        let s = security();
        let token = s.encrypt("", 0, "");

        let parts: Vec<&str> = token.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 16);
        assert_eq!(parts[1].len(), 24);
        assert_eq!(parts[2].len(), 32);

        assert_eq!(s.decrypt("", 0, &token).unwrap(), "");
    }

    #[test]
    fn tokens_are_randomized() {
        let s = security();
        assert_ne!(s.encrypt("pw", 1, "same"), s.encrypt("pw", 1, "same"));
    }

    #[test]
    fn wrong_timestamp_fails_authentication() {
        let s = security();
        let token = s.encrypt("passphrase", 100, "payload");

        assert_eq!(
            s.decrypt("passphrase", 101, &token).unwrap_err(),
            SecurityError::AuthenticationFailure
        );
    }

    #[test]
    fn wrong_passphrase_fails_authentication() {
        let s = security();
        let token = s.encrypt("passphrase", 100, "payload");

        assert_eq!(
            s.decrypt("Passphrase", 100, &token).unwrap_err(),
            SecurityError::AuthenticationFailure
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let s = security();
        let token = s.encrypt("passphrase", 100, "payload");

        let (head, last) = token.split_at(token.len() - 1);
        let flipped = if last == "0" { "1" } else { "0" };
        let tampered = format!("{head}{flipped}");

        assert_eq!(
            s.decrypt("passphrase", 100, &tampered).unwrap_err(),
            SecurityError::AuthenticationFailure
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let s = security();

        assert!(matches!(
            s.decrypt("", 0, ""),
            Err(SecurityError::InvalidCiphertext(_))
        ));
        assert!(matches!(
            s.decrypt("pw", 1, "ab-cd"),
            Err(SecurityError::InvalidCiphertext(_))
        ));
        assert!(matches!(
            s.decrypt("pw", 1, "xx-yy-zz"),
            Err(SecurityError::DecodeError(_))
        ));
    }

    #[test]
    fn non_utf8_plaintext_is_a_decode_error() {
        let s = security();
        let salt = [1u8; crypto::SALT_LEN];
        let nonce = [2u8; crypto::NONCE_LEN];
        let key = crypto::derive_pbkdf2_key("pw", 5, &salt);
        let ciphertext = crypto::encrypt(&key, &nonce, &[0xFF, 0xFE]).unwrap();
        let token = EncryptionToken::new(salt, nonce, ciphertext).to_string();

        assert_eq!(s.decrypt_bytes("pw", 5, &token).unwrap().as_slice(), &[0xFF, 0xFE]);
        assert!(matches!(
            s.decrypt("pw", 5, &token),
            Err(SecurityError::DecodeError(_))
        ));
    }

    #[test]
    fn hmac_password_vector() {
        let s = security();
        assert_eq!(s.hash_password("secret-key", "password"), HMAC_VECTOR);
        assert!(s.compare_hash_password("secret-key", HMAC_VECTOR, "password"));
        assert!(!s.compare_hash_password("secret-key", &format!("{HMAC_VECTOR}a"), "password"));
    }

    #[test]
    fn scrypt_password_vector() {
        let s = security();
        assert_eq!(s.scrypt_password(SALT, PASSWORD), SCRYPT_VECTOR);
        assert_eq!(s.try_scrypt_password(SALT, PASSWORD).unwrap(), SCRYPT_VECTOR);
    }

    #[test]
    fn scrypt_verification_is_symmetric() {
        let s = security();

        assert!(s.compare_scrypt_password(SCRYPT_VECTOR, SALT, PASSWORD));
        assert!(!s.compare_scrypt_password(SCRYPT_VECTOR, SALT, "D0wn5izeDd3v6"));
        assert!(!s.compare_scrypt_password(SCRYPT_VECTOR, "ekr/rlgB6tovwA==", PASSWORD));

        let other_hash = s.scrypt_password("AAAA", PASSWORD);
        assert!(!s.compare_scrypt_password(&other_hash, SALT, PASSWORD));
    }

    #[test]
    fn undecodable_stored_hash_is_reported_and_rejected() {
        let (s, reporter) = recording();

        assert!(!s.compare_scrypt_password("%%%", SALT, PASSWORD));
        assert_eq!(reporter.contexts(), vec!["compare_scrypt_password"]);
    }

    #[test]
    fn legacy_scrypt_treats_bad_salt_as_empty() {
        let (s, reporter) = recording();

        let degraded = s.scrypt_password("not base64!", PASSWORD);
        assert_eq!(degraded, s.scrypt_password("", PASSWORD));
        assert_eq!(reporter.contexts(), vec!["scrypt_password"]);

        assert!(matches!(
            s.try_scrypt_password("not base64!", PASSWORD),
            Err(SecurityError::DecodeError(_))
        ));
    }

    #[test]
    fn legacy_scrypt_hash_with_bad_salt_still_verifies() {
        let (s, reporter) = recording();

        let hash = s.scrypt_password("not base64!", PASSWORD);
        assert!(s.compare_scrypt_password(&hash, "not base64!", PASSWORD));
        assert!(!s.compare_scrypt_password(&hash, "not base64!", "other"));
        assert_eq!(
            reporter.contexts(),
            vec![
                "scrypt_password",
                "compare_scrypt_password",
                "compare_scrypt_password"
            ]
        );
    }

    #[test]
    fn legacy_encrypt_reports_rng_failure_and_returns_empty() {
        let (s, reporter) = recording();

        let token = s.encrypt_with_rng(|_| Err(SecurityError::RandomUnavailable), "pw", 1, "text");

        assert_eq!(token, "");
        assert_eq!(reporter.contexts(), vec!["encrypt"]);
    }

    #[test]
    fn legacy_encrypt_with_working_rng_roundtrips() {
        let (s, reporter) = recording();

        let token = s.encrypt_with_rng(crypto::secure_random, "pw", 1, "text");

        assert_eq!(s.decrypt("pw", 1, &token).unwrap(), "text");
        assert!(reporter.contexts().is_empty());
    }

    #[test]
    fn successful_operations_report_nothing() {
        let (s, reporter) = recording();

        let token = s.encrypt("pw", 9, "text");
        s.decrypt("pw", 9, &token).unwrap();
        s.hash_password("k", "p");

        assert!(reporter.contexts().is_empty());
    }

    #[test]
    fn generated_scrypt_salt_is_usable() {
        let s = security();
        let salt = s.generate_scrypt_salt().unwrap();
        let hash = s.try_scrypt_password(&salt, "pw").unwrap();

        assert!(s.compare_scrypt_password(&hash, &salt, "pw"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn decrypt_inverts_encrypt(
            passphrase in ".{0,16}",
            timestamp in any::<i64>(),
            plaintext in ".{0,64}",
        ) {
            let s = security();
            let token = s.try_encrypt(&passphrase, timestamp, &plaintext).unwrap();
            prop_assert_eq!(s.decrypt(&passphrase, timestamp, &token).unwrap(), plaintext);
        }

        #[test]
        fn decrypt_rejects_other_timestamps(t1 in any::<i64>(), t2 in any::<i64>()) {
            prop_assume!(t1 != t2);
            let s = security();
            let token = s.try_encrypt("pw", t2, "payload").unwrap();
            prop_assert_eq!(
                s.decrypt("pw", t1, &token).unwrap_err(),
                SecurityError::AuthenticationFailure
            );
        }
    }
}
