use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// Token does not have the `salt-nonce-ciphertext` shape.
    InvalidCiphertext(String),
    /// A hex or base64 value could not be decoded.
    DecodeError(String),
    /// AES-GCM tag verification failed.
    AuthenticationFailure,
    KeyDerivationError(String),
    RandomUnavailable,
    InvalidConfig(String),
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityError::InvalidCiphertext(m) => write!(f, "invalid ciphertext: {m}"),
            SecurityError::DecodeError(m) => write!(f, "decode error: {m}"),
            SecurityError::AuthenticationFailure => {
                write!(f, "invalid key material or corrupted data")
            }
            SecurityError::KeyDerivationError(m) => write!(f, "key derivation failed: {m}"),
            SecurityError::RandomUnavailable => write!(f, "OS random generator unavailable"),
            SecurityError::InvalidConfig(m) => write!(f, "invalid security config: {m}"),
        }
    }
}

impl std::error::Error for SecurityError {}

pub type Result<T> = std::result::Result<T, SecurityError>;
