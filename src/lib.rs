//! # http-auth-sign-in
//!
//! Public-key sign-in between two peers, with the authenticated session
//! handed to an HTTP layer.
//!
//! A server (`sid`) and a client (`cid`) exchange fresh 256-bit nonces
//! (`sc`, `cc`). The client signs a canonical body binding both identities
//! and both nonces, and the server verifies the signature before opening a
//! web session. Two entry flows exist:
//!
//! - **Web URL**: the client builds `https://<host>/login?...` carrying its
//!   identity and a fresh `cc`; the server then asks the client for a
//!   solution over an existing peer connection (`httpAuth.requestSolution`).
//! - **Sign-in URI**: the server hands the client an
//!   `ssb:experimental?action=start-http-auth&...` URI; the client answers
//!   with its solution (`httpAuth.sendSolution`).
//!
//! ## Feature Flags
//!
//! - `client` (default): [`client::HttpAuthClient`] and the URI/URL formats
//! - `server` (default): [`server::ServerHandshakeHandler`], [`server::ClientHandshakeResponder`]
//!   and role selection
//!
//! ## Modules
//!
//! - [`core`]: constants, errors, identities, addresses, collaborator traits
//! - [`crypto`]: keys, nonces, solutions
//! - [`tokens`]: the expiring client nonce cache
//! - [`client`]: client orchestrator (requires `client` feature)
//! - [`server`]: responder side (requires `server` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use http_auth_sign_in::prelude::*;
//!
//! let server = Keypair::generate();
//! let client = Keypair::generate();
//! let sc = Nonce::generate();
//! let cc = Nonce::generate();
//!
//! let variant = ProtocolVariant::default();
//! let sol = variant.solve(
//!     &client,
//!     server.identity(),
//!     client.identity(),
//!     sc.as_str(),
//!     cc.as_str(),
//! );
//! assert!(variant.verify(
//!     client.identity(),
//!     &sol,
//!     server.identity(),
//!     client.identity(),
//!     sc.as_str(),
//!     cc.as_str(),
//! ));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Keys, nonces and solutions
pub mod crypto;

// Client nonce cache
pub mod tokens;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

// Server API (feature-gated)
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types and collaborator traits
    pub use crate::core::{
        BoundResponder, Dialer, HandshakeError, HandshakeResponder, Identity, IdentityError,
        MultiserverAddress, PeerDirectory, PeerEntry, RemoteError, RemotePeer, Role, SessionStore,
    };

    pub use crate::crypto::{Keypair, Nonce, ProtocolVariant, Solution};
    pub use crate::tokens::{NonceCache, NonceCacheConfig};

    #[cfg(feature = "client")]
    pub use crate::client::{ClientConfig, HttpAuthClient, HttpAuthClientBuilder, SignInUri};

    #[cfg(feature = "server")]
    pub use crate::server::{
        ClientHandshakeResponder, MemorySessionStore, NoncePolicy, ServerConfig,
        ServerHandshakeBuilder, ServerHandshakeHandler,
    };
}

// Re-export commonly used items at crate root
pub use crate::core::{HandshakeError, Identity, RemoteError, Result};
pub use crate::crypto::{Keypair, Nonce, ProtocolVariant, Solution};
pub use crate::tokens::NonceCache;

#[cfg(feature = "client")]
pub use url::Url;
