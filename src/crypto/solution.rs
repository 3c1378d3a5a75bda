//! Sign-in solutions
//!
//! A solution is an ed25519 signature over the canonical body
//!
//! ```text
//! =http-auth-sign-in:<A>:<B>:<X>:<Y>
//! ```
//!
//! where `(A, B)` are identities and `(X, Y)` nonces. The order of the four
//! fields is part of the wire contract. [`solve`] and [`verify`] take them in
//! exactly the order given; [`ProtocolVariant`] maps the `(sid, cid, sc, cc)`
//! roles onto that order for a deployment.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signature, Verifier};

use super::keys::Keypair;
use crate::core::{Identity, SIGN_IN_TAG, SIGNATURE_SUFFIX};

/// Field order of the canonical body.
///
/// The two orders are not wire-compatible. A deployment picks one and every
/// peer in it uses the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// `<sid>:<cid>:<sc>:<cc>`
    #[default]
    Solution,
    /// `<cid>:<sid>:<cc>:<sc>`
    ChallengeResponse,
}

/// The four body fields in signing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyFields<'a> {
    /// First identity slot.
    pub identity_a: &'a Identity,
    /// Second identity slot.
    pub identity_b: &'a Identity,
    /// First nonce slot.
    pub nonce_a: &'a str,
    /// Second nonce slot.
    pub nonce_b: &'a str,
}

impl ProtocolVariant {
    /// Arrange the handshake roles in this variant's order.
    pub fn arrange<'a>(
        self,
        sid: &'a Identity,
        cid: &'a Identity,
        sc: &'a str,
        cc: &'a str,
    ) -> BodyFields<'a> {
        match self {
            ProtocolVariant::Solution => BodyFields {
                identity_a: sid,
                identity_b: cid,
                nonce_a: sc,
                nonce_b: cc,
            },
            ProtocolVariant::ChallengeResponse => BodyFields {
                identity_a: cid,
                identity_b: sid,
                nonce_a: cc,
                nonce_b: sc,
            },
        }
    }

    /// Sign for the client `cid` of server `sid`.
    pub fn solve(
        self,
        keys: &Keypair,
        sid: &Identity,
        cid: &Identity,
        sc: &str,
        cc: &str,
    ) -> Solution {
        let f = self.arrange(sid, cid, sc, cc);
        solve(keys, f.identity_a, f.identity_b, f.nonce_a, f.nonce_b)
    }

    /// Verify a solution signed by `signer` for this variant's order.
    pub fn verify(
        self,
        signer: &Identity,
        sol: &Solution,
        sid: &Identity,
        cid: &Identity,
        sc: &str,
        cc: &str,
    ) -> bool {
        let f = self.arrange(sid, cid, sc, cc);
        verify(signer, sol, f.identity_a, f.identity_b, f.nonce_a, f.nonce_b)
    }
}

/// Encoded signature over a canonical body: `<base64>.sig.ed25519`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Solution(String);

impl Solution {
    /// Wrap a solution received from the wire.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    fn from_signature(signature: &Signature) -> Self {
        Self(format!("{}{SIGNATURE_SUFFIX}", BASE64.encode(signature.to_bytes())))
    }

    /// Decode the signature, if the encoding is well formed.
    pub fn signature(&self) -> Option<Signature> {
        let body = self.0.strip_suffix(SIGNATURE_SUFFIX)?;
        let bytes = BASE64.decode(body).ok()?;
        let bytes: [u8; Signature::BYTE_SIZE] = bytes.try_into().ok()?;
        Some(Signature::from_bytes(&bytes))
    }

    /// The encoded solution.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Solution({})", self.0)
    }
}

/// Build the canonical body from fields in signing order.
pub fn canonical_body(
    identity_a: &Identity,
    identity_b: &Identity,
    nonce_a: &str,
    nonce_b: &str,
) -> String {
    format!("{SIGN_IN_TAG}:{identity_a}:{identity_b}:{nonce_a}:{nonce_b}")
}

/// Sign the canonical body of the given fields.
pub fn solve(
    keys: &Keypair,
    identity_a: &Identity,
    identity_b: &Identity,
    nonce_a: &str,
    nonce_b: &str,
) -> Solution {
    let body = canonical_body(identity_a, identity_b, nonce_a, nonce_b);
    Solution::from_signature(&keys.sign(body.as_bytes()))
}

/// Check that `sol` is `signer`'s signature over the canonical body.
pub fn verify(
    signer: &Identity,
    sol: &Solution,
    identity_a: &Identity,
    identity_b: &Identity,
    nonce_a: &str,
    nonce_b: &str,
) -> bool {
    let Ok(key) = signer.verifying_key() else {
        return false;
    };
    let Some(signature) = sol.signature() else {
        return false;
    };
    let body = canonical_body(identity_a, identity_b, nonce_a, nonce_b);
    key.verify(body.as_bytes(), &signature).is_ok()
}
