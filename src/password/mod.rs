//! Password hashing.
//!
//! - [`hmac`]: keyed HMAC-SHA256 fingerprints rendered as lowercase hex.
//! - [`scrypt`]: scrypt-derived keys applied to the configured signer key,
//!   compatible with hashes produced by the legacy identity provider.

pub mod hmac;
pub mod scrypt;

pub use scrypt::generate_salt as generate_scrypt_salt;
