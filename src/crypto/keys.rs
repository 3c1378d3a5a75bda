//! Ed25519 key management
//!
//! The long-term keypair that backs a peer's [`Identity`].

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::core::{IDENTITY_SUFFIX, Identity, IdentityError, SECRET_KEY_SIZE, SEED_SIZE};

/// A static ed25519 keypair for long-term identity.
///
/// The signing key is zeroized on drop.
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
    identity: Identity,
}

impl Keypair {
    /// Generate a new random keypair from the OS randomness source.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create a keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_SIZE]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Load a keypair from the `<base64 seed||public>.ed25519` secret format.
    ///
    /// The embedded public half must match the seed.
    pub fn from_secret_base64(secret: &str) -> Result<Self, IdentityError> {
        let body = secret.strip_suffix(IDENTITY_SUFFIX).unwrap_or(secret);
        let bytes = Zeroizing::new(BASE64.decode(body).map_err(|_| IdentityError::BadEncoding)?);
        let bytes: &[u8; SECRET_KEY_SIZE] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::BadLength {
                    expected: SECRET_KEY_SIZE,
                    actual: bytes.len(),
                })?;
        let signing = SigningKey::from_keypair_bytes(bytes).map_err(|_| IdentityError::InvalidKey)?;
        Ok(Self::from_signing_key(signing))
    }

    fn from_signing_key(signing: SigningKey) -> Self {
        let identity = Identity::from_public_key(signing.verifying_key().to_bytes());
        Self { signing, identity }
    }

    /// Identity derived from the public half.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Export the secret in `<base64 seed||public>.ed25519` form.
    ///
    /// # Security
    /// Handle with care - this exposes sensitive key material.
    pub fn to_secret_base64(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing.to_keypair_bytes());
        Zeroizing::new(format!("{}{IDENTITY_SUFFIX}", BASE64.encode(bytes.as_slice())))
    }

    /// Sign an arbitrary message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("identity", &self.identity)
            .field("signing", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();

        // Keys should be different
        assert_ne!(kp1.identity(), kp2.identity());
    }

    #[test]
    fn test_keypair_from_seed_is_deterministic() {
        let kp1 = Keypair::from_seed(&[0x11; 32]);
        let kp2 = Keypair::from_seed(&[0x11; 32]);
        assert_eq!(kp1.identity(), kp2.identity());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn test_secret_roundtrip() {
        let kp = Keypair::generate();
        let secret = kp.to_secret_base64();
        assert!(secret.ends_with(".ed25519"));

        let loaded = Keypair::from_secret_base64(&secret).unwrap();
        assert_eq!(loaded.identity(), kp.identity());
    }

    #[test]
    fn test_secret_rejects_mismatched_public_half() {
        let kp = Keypair::from_seed(&[0x22; 32]);
        let mut bytes = kp.signing.to_keypair_bytes();
        bytes[63] ^= 0xff;
        let tampered = BASE64.encode(bytes);
        assert_eq!(
            Keypair::from_secret_base64(&tampered).unwrap_err(),
            IdentityError::InvalidKey
        );
    }

    #[test]
    fn test_secret_rejects_wrong_length() {
        let err = Keypair::from_secret_base64(&BASE64.encode([0u8; 32])).unwrap_err();
        assert_eq!(
            err,
            IdentityError::BadLength {
                expected: 64,
                actual: 32
            }
        );
    }
}
