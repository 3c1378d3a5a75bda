//! High-level sign-in client.
//!
//! Provides `HttpAuthClient`, which drives the client side of the handshake:
//! producing a web login URL for a connected server, consuming a sign-in URI
//! handed over by a server, and signing out everywhere.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use super::uri::{SignInUri, sign_in_web_url};
use crate::core::{
    DEFAULT_LOGIN_PATH, DEFAULT_WEB_MARKER, Dialer, HandshakeError, Identity, MultiserverAddress,
    OP_INVALIDATE_ALL_SOLUTIONS, OP_SEND_SOLUTION, PeerDirectory, PeerStep, RemotePeer,
    Unreachable,
};
use crate::crypto::{Keypair, ProtocolVariant};
use crate::tokens::NonceCache;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Body field order of the deployment.
    pub variant: ProtocolVariant,

    /// Path of the server's web login endpoint.
    pub login_path: String,

    /// Query flag marking the web login as handshake-driven.
    pub web_marker: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            variant: ProtocolVariant::default(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            web_marker: DEFAULT_WEB_MARKER.to_owned(),
        }
    }
}

/// Builder for creating a `ClientConfig`.
#[derive(Debug)]
pub struct HttpAuthClientBuilder {
    config: ClientConfig,
}

impl HttpAuthClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the protocol variant.
    pub fn variant(mut self, variant: ProtocolVariant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Set the web login path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Set the web login marker flag.
    pub fn web_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.web_marker = marker.into();
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for HttpAuthClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client side of the sign-in handshake.
///
/// # Example
///
/// ```ignore
/// use http_auth_sign_in::client::{HttpAuthClient, HttpAuthClientBuilder};
///
/// let config = HttpAuthClientBuilder::new().build();
/// let client = HttpAuthClient::new(keys, tokens, peers, dialer, config);
///
/// // Open the web login of a connected server
/// let url = client.produce_sign_in_web_url("@room.ed25519")?;
///
/// // Or answer a sign-in URI the server handed over
/// let accepted = client.consume_sign_in_uri(&uri).await?;
/// ```
pub struct HttpAuthClient {
    /// Local keypair.
    keys: Arc<Keypair>,

    /// Client nonce cache, shared with the local responder.
    tokens: NonceCache,

    /// Connectivity query.
    peers: Arc<dyn PeerDirectory>,

    /// Connection dispatch.
    dialer: Arc<dyn Dialer>,

    /// Client configuration.
    config: ClientConfig,
}

impl HttpAuthClient {
    /// Create a client.
    pub fn new(
        keys: Arc<Keypair>,
        tokens: NonceCache,
        peers: Arc<dyn PeerDirectory>,
        dialer: Arc<dyn Dialer>,
        config: ClientConfig,
    ) -> Self {
        Self {
            keys,
            tokens,
            peers,
            dialer,
            config,
        }
    }

    /// Local identity (`cid`).
    pub fn identity(&self) -> &Identity {
        self.keys.identity()
    }

    /// The client nonce cache.
    pub fn tokens(&self) -> &NonceCache {
        &self.tokens
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the web login URL of a connected server.
    ///
    /// Mints a fresh client nonce and embeds it with our identity.
    pub fn produce_sign_in_web_url(&self, sid: &str) -> Result<Url, HandshakeError> {
        let sid = parse_server_identity(sid)?;

        let peer = self
            .peers
            .peers_connected()
            .into_iter()
            .find(|peer| peer.identity == sid)
            .ok_or_else(|| unreachable(&sid, PeerStep::SignIn, Unreachable::Disconnected))?;

        let bad_address = || {
            unreachable(
                &sid,
                PeerStep::SignIn,
                Unreachable::BadAddress(peer.address.to_string()),
            )
        };
        let net = peer.address.net_address().ok_or_else(bad_address)?;

        let cc = self.tokens.create();
        let url = sign_in_web_url(
            &net.host,
            &self.config.login_path,
            &self.config.web_marker,
            self.identity(),
            cc.as_str(),
        )
        .map_err(|_| bad_address())?;

        debug!(%sid, host = %net.host, "produced sign-in web URL");
        Ok(url)
    }

    /// Answer a sign-in URI handed over by a server.
    ///
    /// Returns the server's answer to our solution.
    pub async fn consume_sign_in_uri(&self, uri: &str) -> Result<bool, HandshakeError> {
        let SignInUri {
            sid,
            sc,
            multiserver_address,
        } = SignInUri::parse(uri)?;

        let address = match multiserver_address {
            Some(address) => address,
            None => self
                .peers
                .peers_all()
                .into_iter()
                .find(|peer| peer.identity == sid)
                .map(|peer| peer.address)
                .ok_or_else(|| unreachable(&sid, PeerStep::SignIn, Unreachable::Unknown))?,
        };

        let cc = self.tokens.create();
        let cid = self.identity();
        let sol = self.config.variant.solve(&self.keys, &sid, cid, &sc, cc.as_str());
        debug!(%sid, %cid, sc = %sc, cc = %cc, "sendSolution");

        let remote = self.dial(&sid, &address, PeerStep::SignIn).await?;
        let answer = remote
            .send_solution(&sc, cc.as_str(), &sol)
            .await
            .map_err(|e| rejected(&sid, OP_SEND_SOLUTION, e.0))?;

        debug!(%sid, answer, "server answered sendSolution");
        Ok(answer)
    }

    /// Ask a connected server to revoke every session it opened for us.
    pub async fn invalidate_all_sessions(&self, sid: &str) -> Result<bool, HandshakeError> {
        let sid = parse_server_identity(sid)?;

        let peer = self
            .peers
            .peers_connected()
            .into_iter()
            .find(|peer| peer.identity == sid)
            .ok_or_else(|| unreachable(&sid, PeerStep::SignOut, Unreachable::Disconnected))?;

        let remote = self.dial(&sid, &peer.address, PeerStep::SignOut).await?;
        let answer = remote
            .invalidate_all_solutions()
            .await
            .map_err(|e| rejected(&sid, OP_INVALIDATE_ALL_SOLUTIONS, e.0))?;

        debug!(%sid, answer, "server answered invalidateAllSolutions");
        Ok(answer)
    }

    /// Stop the nonce sweeper and forget every issued nonce.
    pub fn close(&self) {
        self.tokens.shutdown();
    }

    async fn dial(
        &self,
        sid: &Identity,
        address: &MultiserverAddress,
        step: PeerStep,
    ) -> Result<Arc<dyn RemotePeer>, HandshakeError> {
        match self.dialer.connect(address).await {
            Ok(Some(remote)) => Ok(remote),
            Ok(None) => Err(unreachable(sid, step, Unreachable::Offline)),
            Err(e) => Err(unreachable(sid, step, Unreachable::ConnectFailed(e.0))),
        }
    }
}

impl std::fmt::Debug for HttpAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthClient")
            .field("identity", self.identity())
            .field("config", &self.config)
            .finish()
    }
}

fn parse_server_identity(sid: &str) -> Result<Identity, HandshakeError> {
    Identity::parse(sid).map_err(|_| HandshakeError::MalformedIdentity {
        field: "sid",
        value: sid.to_owned(),
    })
}

fn unreachable(sid: &Identity, step: PeerStep, reason: Unreachable) -> HandshakeError {
    HandshakeError::PeerUnreachable {
        identity: sid.to_string(),
        step,
        reason,
    }
}

fn rejected(sid: &Identity, operation: &'static str, reason: String) -> HandshakeError {
    HandshakeError::RemoteRejected {
        identity: sid.to_string(),
        operation,
        reason,
    }
}
