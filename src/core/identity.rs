//! Peer identities.
//!
//! An identity names a peer's long-term ed25519 public key:
//! `@<base64 public key>.ed25519`. The string form is what gets embedded in
//! signed bodies and URLs, so it is kept verbatim next to the decoded key.

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::VerifyingKey;

use super::constants::{IDENTITY_SIGIL, IDENTITY_SUFFIX, PUBLIC_KEY_SIZE};
use super::error::IdentityError;

/// Public-key-derived identity of a peer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    text: String,
    key: [u8; PUBLIC_KEY_SIZE],
}

impl Identity {
    /// Build the identity of a public key.
    pub fn from_public_key(key: [u8; PUBLIC_KEY_SIZE]) -> Self {
        let text = format!("{IDENTITY_SIGIL}{}{IDENTITY_SUFFIX}", BASE64.encode(key));
        Self { text, key }
    }

    /// Parse an identity string.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let body = s
            .strip_prefix(IDENTITY_SIGIL)
            .and_then(|rest| rest.strip_suffix(IDENTITY_SUFFIX))
            .ok_or(IdentityError::BadFormat)?;

        let bytes = BASE64.decode(body).map_err(|_| IdentityError::BadEncoding)?;
        let key: [u8; PUBLIC_KEY_SIZE] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::BadLength {
                    expected: PUBLIC_KEY_SIZE,
                    actual: bytes.len(),
                })?;

        Ok(Self {
            text: s.to_owned(),
            key,
        })
    }

    /// True if `s` parses as an identity.
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// The identity string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.key
    }

    /// Ed25519 verifying key for signatures made by this peer.
    pub fn verifying_key(&self) -> Result<VerifyingKey, IdentityError> {
        VerifyingKey::from_bytes(&self.key).map_err(|_| IdentityError::InvalidKey)
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.text)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
