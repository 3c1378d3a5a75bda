//! Handshake nonces
//!
//! A nonce is 256 bits from the OS randomness source, carried as standard
//! base64. Peers only check the encoded length of nonces they receive, so the
//! length rule lives here next to the generator.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::{RngCore, rngs::OsRng};

use crate::core::{HandshakeError, NONCE_LENGTH_BASE64, NONCE_LENGTH_BYTES, NonceRole};

/// A printable 256-bit nonce.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// Generate a fresh nonce.
    ///
    /// # Panics
    /// Panics if the OS randomness source fails; there is no weaker fallback.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LENGTH_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(BASE64.encode(bytes))
    }

    /// The encoded nonce.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.0)
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Nonce> for String {
    fn from(nonce: Nonce) -> String {
        nonce.0
    }
}

/// Reject nonces whose encoding is too short to carry 256 bits.
///
/// Length is counted in characters.
pub fn check_nonce_length(role: NonceRole, value: &str) -> Result<(), HandshakeError> {
    if value.chars().count() < NONCE_LENGTH_BASE64 {
        return Err(HandshakeError::NonceTooShort {
            role,
            value: value.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_256_bits() {
        let nonce = Nonce::generate();
        let decoded = BASE64.decode(nonce.as_str()).unwrap();
        assert_eq!(decoded.len(), 32);
        assert!(check_nonce_length(NonceRole::Client, nonce.as_str()).is_ok());
    }

    #[test]
    fn test_nonces_are_distinct() {
        let a = Nonce::generate();
        let b = Nonce::generate();

        // Different with overwhelming probability
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_nonce_rejected() {
        let short = BASE64.encode([0u8; 16]);
        let err = check_nonce_length(NonceRole::Server, &short).unwrap_err();
        assert_eq!(
            err,
            HandshakeError::NonceTooShort {
                role: NonceRole::Server,
                value: short,
            }
        );
    }

    #[test]
    fn test_length_boundary() {
        assert!(check_nonce_length(NonceRole::Client, &"A".repeat(42)).is_err());
        assert!(check_nonce_length(NonceRole::Client, &"A".repeat(43)).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        // 45 bytes, 15 characters
        let wide = "\u{20ac}".repeat(15);
        assert_eq!(wide.len(), 45);
        assert!(check_nonce_length(NonceRole::Server, &wide).is_err());
        assert!(check_nonce_length(NonceRole::Server, &"\u{20ac}".repeat(43)).is_ok());
    }
}
