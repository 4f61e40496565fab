//! Cryptographic primitives for the security module.
//!
//! Provides randomness, AES-256-GCM sealing, PBKDF2/scrypt key derivation,
//! the zero-IV AES-CTR transform used by scrypt password hashes, and
//! constant-time comparison.

pub mod aead;
pub mod compare;
pub mod ctr;
pub mod kdf;

pub use aead::{decrypt, encrypt, generate_nonce, generate_salt, secure_random};
pub use compare::bytes_equal;
pub use ctr::apply_zero_iv_keystream;
pub use kdf::{ScryptParams, derive_pbkdf2_key, derive_scrypt_key};

/// Length of the PBKDF2 salt embedded in encryption tokens (8 bytes).
pub const SALT_LEN: usize = 8;
/// Length of the AES-GCM nonce (12 bytes).
pub const NONCE_LEN: usize = 12;
/// Length of the AES-GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of every derived key (32 bytes / AES-256).
pub const KEY_LEN: usize = 32;
/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 1000;
/// Scrypt parallelism, fixed for compatibility with stored hashes.
pub const SCRYPT_PARALLELISM: u32 = 1;
