//! Error types for the sign-in handshake.

use std::fmt;

use thiserror::Error;

use super::constants::NONCE_LENGTH;

/// Errors raised while parsing identities or key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Identity does not start with `@` or end with `.ed25519`.
    #[error("identity must look like @<base64>.ed25519")]
    BadFormat,

    /// The base64 body could not be decoded.
    #[error("invalid base64 in key material")]
    BadEncoding,

    /// Decoded key has the wrong size.
    #[error("expected {expected} key bytes, got {actual}")]
    BadLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Bytes are not a valid ed25519 point or keypair.
    #[error("key material is not a valid ed25519 key")]
    InvalidKey,
}

/// Which side chose a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceRole {
    /// `sc`, chosen by the authenticating server.
    Server,
    /// `cc`, chosen by the client.
    Client,
}

impl NonceRole {
    /// Query/field name of the nonce on the wire.
    pub fn field(self) -> &'static str {
        match self {
            NonceRole::Server => "sc",
            NonceRole::Client => "cc",
        }
    }
}

impl fmt::Display for NonceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chooser = match self {
            NonceRole::Server => "Server",
            NonceRole::Client => "Client",
        };
        write!(f, "{chooser} nonce \"{}\"", self.field())
    }
}

/// Which side of the handshake a peer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Authenticates clients: verifies solutions and owns their sessions.
    Server,
    /// Signs in to servers: answers solution requests for its own nonces.
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Server => write!(f, "server"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// What is wrong with an inbound sign-in URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriDefect {
    /// Not a URI at all.
    Unparsable,
    /// Scheme is not `ssb`.
    WrongScheme,
    /// Neither host nor path is `experimental`.
    NotExperimental,
    /// A required query parameter is absent.
    MissingQuery(&'static str),
}

impl fmt::Display for UriDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriDefect::Unparsable => write!(f, "not a URI"),
            UriDefect::WrongScheme => write!(f, "wrong scheme"),
            UriDefect::NotExperimental => write!(f, "not an experimental URI"),
            UriDefect::MissingQuery(name) => write!(f, "missing \"{name}\" query"),
        }
    }
}

/// Which client step needed the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStep {
    /// Producing a URL or consuming a sign-in URI.
    SignIn,
    /// Invalidating sessions.
    SignOut,
}

impl fmt::Display for PeerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerStep::SignIn => write!(f, "sign-in to"),
            PeerStep::SignOut => write!(f, "sign-out from"),
        }
    }
}

/// Why a peer could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unreachable {
    /// Peer is not among the connected peers.
    Disconnected,
    /// Peer is known but no host could be extracted from its address.
    BadAddress(String),
    /// Peer is neither in the URI nor in the known-peers set.
    Unknown,
    /// The dialer reported an error.
    ConnectFailed(String),
    /// The dialer connected nothing; the peer seems offline.
    Offline,
}

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unreachable::Disconnected => write!(f, "server is disconnected"),
            Unreachable::BadAddress(addr) => write!(f, "server has bad address {addr}"),
            Unreachable::Unknown => write!(f, "server is unknown"),
            Unreachable::ConnectFailed(reason) => write!(f, "connect failed: {reason}"),
            Unreachable::Offline => write!(f, "it seems offline"),
        }
    }
}

/// Handshake errors.
///
/// Validation variants are raised before any network or signing work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// An identity string is malformed.
    #[error("invalid identity in \"{field}\": {value}")]
    MalformedIdentity {
        /// Where the identity came from (`sid`, `cid`, ...).
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// Inbound URI is not a sign-in URI.
    #[error("invalid sign-in URI ({defect}): {uri}")]
    MalformedUri {
        /// The offending URI.
        uri: String,
        /// What is wrong with it.
        defect: UriDefect,
    },

    /// URI is well formed but its action is not the handshake start.
    #[error("URI is unrelated to http auth: {0}")]
    UnrelatedAction(String),

    /// A nonce is shorter than 256 bits of base64.
    #[error("{role} is less than {bits} bits: {value}", bits = NONCE_LENGTH)]
    NonceTooShort {
        /// Which nonce.
        role: NonceRole,
        /// The offending value.
        value: String,
    },

    /// Client nonce is not live in the local cache.
    #[error("The client nonce \"cc\" is unknown or has expired")]
    NonceUnknownOrExpired,

    /// A peer could not be reached.
    #[error("Cannot {step} {identity}: {reason}")]
    PeerUnreachable {
        /// Target server identity.
        identity: String,
        /// Step that needed the peer.
        step: PeerStep,
        /// Why it failed.
        reason: Unreachable,
    },

    /// The remote handshake operation failed.
    #[error("{operation} at {identity} failed: {reason}")]
    RemoteRejected {
        /// Remote identity.
        identity: String,
        /// Remote operation name.
        operation: &'static str,
        /// Short reason sent by the remote.
        reason: String,
    },

    /// Operation is not served by this role.
    #[error("{operation} not supported on the {role} side")]
    RoleNotSupported {
        /// Remote operation name.
        operation: &'static str,
        /// Role of the peer that refused it.
        role: Role,
    },

    /// A solution failed verification.
    #[error("solution does not verify for {0}")]
    InvalidSolution(String),

    /// The session collaborator failed.
    #[error("session store failed: {0}")]
    SessionStore(String),
}

impl HandshakeError {
    /// True for errors raised by local validation.
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            HandshakeError::PeerUnreachable { .. } | HandshakeError::RemoteRejected { .. }
        )
    }
}

/// Short failure reason as carried across the RPC boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    /// Create a remote error from any displayable reason.
    pub fn new(reason: impl fmt::Display) -> Self {
        Self(reason.to_string())
    }
}

impl From<HandshakeError> for RemoteError {
    fn from(err: HandshakeError) -> Self {
        Self(err.to_string())
    }
}

/// Result alias for handshake operations.
pub type Result<T> = std::result::Result<T, HandshakeError>;
