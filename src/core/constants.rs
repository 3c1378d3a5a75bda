//! Protocol constants for the HTTP sign-in handshake.
//!
//! These values are part of the wire contract and MUST NOT be changed
//! without coordinating with every peer of a deployment.

use std::time::Duration;

// =============================================================================
// NONCES
// =============================================================================

/// Nonce length in bits.
pub const NONCE_LENGTH: usize = 256;

/// Nonce length in bytes.
pub const NONCE_LENGTH_BYTES: usize = NONCE_LENGTH / 8;

/// Minimum length of a base64-encoded nonce, `ceil(256 / 6)`.
pub const NONCE_LENGTH_BASE64: usize = NONCE_LENGTH.div_ceil(6);

// =============================================================================
// NONCE CACHE TIMING
// =============================================================================

/// How often the nonce cache looks for expired tokens.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(20);

/// Maximum age of a client nonce before a sweep removes it.
pub const NONCE_EXPIRY: Duration = Duration::from_secs(120);

// =============================================================================
// IDENTITIES AND SIGNATURES
// =============================================================================

/// Sigil that starts every identity string.
pub const IDENTITY_SIGIL: char = '@';

/// Suffix naming the key curve of an identity.
pub const IDENTITY_SUFFIX: &str = ".ed25519";

/// Suffix appended to base64 signatures.
pub const SIGNATURE_SUFFIX: &str = ".sig.ed25519";

/// Ed25519 public key size.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 seed size.
pub const SEED_SIZE: usize = 32;

/// Ed25519 secret key size in the `seed || public` layout.
pub const SECRET_KEY_SIZE: usize = 64;

// =============================================================================
// CANONICAL BODY
// =============================================================================

/// Leading tag of the signed sign-in body.
pub const SIGN_IN_TAG: &str = "=http-auth-sign-in";

// =============================================================================
// WEB HAND-OFF
// =============================================================================

/// Scheme of inbound sign-in URIs.
pub const URI_SCHEME: &str = "ssb";

/// Host or opaque path marking the experimental auth flow.
pub const URI_EXPERIMENTAL: &str = "experimental";

/// `action` query value that starts the handshake.
pub const ACTION_START_HTTP_AUTH: &str = "start-http-auth";

/// Default path of the web login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default query flag marking a web login as handshake-driven.
pub const DEFAULT_WEB_MARKER: &str = "ssb-http-auth";

// =============================================================================
// RPC OPERATION NAMES
// =============================================================================

/// Remote operation carrying a client-computed solution.
pub const OP_SEND_SOLUTION: &str = "httpAuth.sendSolution";

/// Remote operation asking a peer to compute a solution.
pub const OP_REQUEST_SOLUTION: &str = "httpAuth.requestSolution";

/// Remote operation revoking all sessions of the caller.
pub const OP_INVALIDATE_ALL_SOLUTIONS: &str = "httpAuth.invalidateAllSolutions";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_lengths() {
        assert_eq!(NONCE_LENGTH_BYTES, 32);
        // 32 bytes encode to 44 base64 chars, 43 of which carry data.
        assert_eq!(NONCE_LENGTH_BASE64, 43);
    }
}
