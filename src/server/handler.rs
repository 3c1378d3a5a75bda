//! Handshake responders.
//!
//! The RPC manifest is the same for every peer, but each operation does real
//! work on one side only. [`ServerHandshakeHandler`] serves the authenticating
//! side and [`ClientHandshakeResponder`] the signing-in side; which one a peer
//! exposes is decided once, by [`Role`], when the responder is built.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::session::MemorySessionStore;
use crate::core::{
    HandshakeError, HandshakeResponder, Identity, NonceRole, OP_INVALIDATE_ALL_SOLUTIONS,
    OP_REQUEST_SOLUTION, OP_SEND_SOLUTION, Role, SessionStore,
};
use crate::crypto::{Keypair, ProtocolVariant, Solution, check_nonce_length};
use crate::tokens::NonceCache;

/// What happens to a client nonce once it has been answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoncePolicy {
    /// The first answered request consumes the nonce.
    #[default]
    SingleUse,
    /// The nonce answers requests until the sweep expires it.
    ReusableUntilExpiry,
}

/// Responder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Body field order of the deployment.
    pub variant: ProtocolVariant,

    /// Client nonce consumption.
    pub nonce_policy: NoncePolicy,
}

/// Builder for the handshake responders of one peer.
pub struct ServerHandshakeBuilder {
    keys: Arc<Keypair>,
    tokens: NonceCache,
    sessions: Option<Arc<dyn SessionStore>>,
    config: ServerConfig,
}

impl ServerHandshakeBuilder {
    /// Create a builder for the peer owning `keys` and `tokens`.
    pub fn new(keys: Arc<Keypair>, tokens: NonceCache) -> Self {
        Self {
            keys,
            tokens,
            sessions: None,
            config: ServerConfig::default(),
        }
    }

    /// Set the session collaborator.
    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Set the protocol variant.
    pub fn variant(mut self, variant: ProtocolVariant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Set the client nonce policy.
    pub fn nonce_policy(mut self, policy: NoncePolicy) -> Self {
        self.config.nonce_policy = policy;
        self
    }

    /// Build the authenticating handler.
    ///
    /// Without a session collaborator, sessions are kept in memory.
    pub fn build(self) -> ServerHandshakeHandler {
        ServerHandshakeHandler {
            keys: self.keys,
            sessions: self
                .sessions
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            config: self.config,
        }
    }

    /// Build the signing-in responder.
    pub fn build_client(self) -> ClientHandshakeResponder {
        ClientHandshakeResponder {
            keys: self.keys,
            tokens: self.tokens,
            config: self.config,
        }
    }

    /// Build the responder for `role`.
    pub fn build_responder(self, role: Role) -> Arc<dyn HandshakeResponder> {
        match role {
            Role::Server => Arc::new(self.build()),
            Role::Client => Arc::new(self.build_client()),
        }
    }
}

fn reject(operation: &'static str, role: Role, caller: &Identity) -> HandshakeError {
    debug!(%caller, operation, %role, "rejected operation not served by this role");
    HandshakeError::RoleNotSupported { operation, role }
}

fn check_nonces(sc: &str, cc: &str) -> Result<(), HandshakeError> {
    check_nonce_length(NonceRole::Server, sc)?;
    check_nonce_length(NonceRole::Client, cc)
}

/// Responder of the authenticating server.
///
/// Verifies solutions sent by clients and hands successful sign-ins to the
/// session collaborator.
pub struct ServerHandshakeHandler {
    keys: Arc<Keypair>,
    sessions: Arc<dyn SessionStore>,
    config: ServerConfig,
}

impl ServerHandshakeHandler {
    /// Local identity.
    pub fn identity(&self) -> &Identity {
        self.keys.identity()
    }

    /// Responder configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[async_trait]
impl HandshakeResponder for ServerHandshakeHandler {
    async fn send_solution(
        &self,
        caller: &Identity,
        sc: &str,
        cc: &str,
        sol: &Solution,
    ) -> Result<bool, HandshakeError> {
        check_nonces(sc, cc)?;

        let sid = self.identity();
        debug!(%sid, cid = %caller, sc, cc, "sendSolution");
        if !self.config.variant.verify(caller, sol, sid, caller, sc, cc) {
            warn!(cid = %caller, "rejected solution that does not verify");
            return Err(HandshakeError::InvalidSolution(caller.to_string()));
        }

        self.sessions
            .sign_in(caller, sc, cc)
            .await
            .map_err(|e| HandshakeError::SessionStore(e.0))
    }

    async fn request_solution(
        &self,
        caller: &Identity,
        _sc: &str,
        _cc: &str,
    ) -> Result<Solution, HandshakeError> {
        Err(reject(OP_REQUEST_SOLUTION, Role::Server, caller))
    }

    async fn invalidate_all_solutions(&self, caller: &Identity) -> Result<bool, HandshakeError> {
        debug!(cid = %caller, "invalidateAllSolutions");
        self.sessions
            .invalidate_all(caller)
            .await
            .map_err(|e| HandshakeError::SessionStore(e.0))?;
        Ok(true)
    }
}

/// Responder of a peer that signs in to servers.
///
/// Answers `requestSolution` for client nonces it issued itself; the other
/// operations belong to the authenticating side.
pub struct ClientHandshakeResponder {
    keys: Arc<Keypair>,
    tokens: NonceCache,
    config: ServerConfig,
}

impl ClientHandshakeResponder {
    /// Local identity.
    pub fn identity(&self) -> &Identity {
        self.keys.identity()
    }

    /// Responder configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn claim_client_nonce(&self, cc: &str) -> bool {
        match self.config.nonce_policy {
            NoncePolicy::SingleUse => self.tokens.take(cc),
            NoncePolicy::ReusableUntilExpiry => self.tokens.has(cc),
        }
    }
}

#[async_trait]
impl HandshakeResponder for ClientHandshakeResponder {
    async fn send_solution(
        &self,
        caller: &Identity,
        _sc: &str,
        _cc: &str,
        _sol: &Solution,
    ) -> Result<bool, HandshakeError> {
        Err(reject(OP_SEND_SOLUTION, Role::Client, caller))
    }

    async fn request_solution(
        &self,
        caller: &Identity,
        sc: &str,
        cc: &str,
    ) -> Result<Solution, HandshakeError> {
        check_nonces(sc, cc)?;
        if !self.claim_client_nonce(cc) {
            return Err(HandshakeError::NonceUnknownOrExpired);
        }

        let cid = self.identity();
        debug!(sid = %caller, %cid, sc, cc, "requestSolution");
        Ok(self.config.variant.solve(&self.keys, caller, cid, sc, cc))
    }

    async fn invalidate_all_solutions(&self, caller: &Identity) -> Result<bool, HandshakeError> {
        Err(reject(OP_INVALIDATE_ALL_SOLUTIONS, Role::Client, caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Nonce, verify};
    use crate::tokens::NonceCacheConfig;

    struct Fixture {
        keys: Arc<Keypair>,
        tokens: NonceCache,
        sessions: Arc<MemorySessionStore>,
        room: Keypair,
    }

    fn fixture() -> Fixture {
        Fixture {
            keys: Arc::new(Keypair::generate()),
            tokens: NonceCache::new(NonceCacheConfig::default()),
            sessions: Arc::new(MemorySessionStore::new()),
            room: Keypair::generate(),
        }
    }

    fn handler(f: &Fixture) -> ServerHandshakeHandler {
        ServerHandshakeBuilder::new(f.keys.clone(), f.tokens.clone())
            .sessions(f.sessions.clone())
            .build()
    }

    fn responder(f: &Fixture, policy: NoncePolicy) -> ClientHandshakeResponder {
        ServerHandshakeBuilder::new(f.keys.clone(), f.tokens.clone())
            .nonce_policy(policy)
            .build_client()
    }

    #[tokio::test]
    async fn test_request_solution_signs_for_caller() {
        let f = fixture();
        let handler = responder(&f, NoncePolicy::SingleUse);
        let sc = Nonce::generate();
        let cc = f.tokens.create();
        let sid = f.room.identity();

        let sol = handler
            .request_solution(sid, sc.as_str(), cc.as_str())
            .await
            .unwrap();

        let cid = f.keys.identity();
        assert!(verify(cid, &sol, sid, cid, sc.as_str(), cc.as_str()));
    }

    #[tokio::test]
    async fn test_request_solution_unknown_nonce() {
        let f = fixture();
        let handler = responder(&f, NoncePolicy::SingleUse);
        let sc = Nonce::generate();
        let cc = Nonce::generate();

        let err = handler
            .request_solution(f.room.identity(), sc.as_str(), cc.as_str())
            .await
            .unwrap_err();
        assert_eq!(err, HandshakeError::NonceUnknownOrExpired);
    }

    #[tokio::test]
    async fn test_request_solution_short_nonces() {
        let f = fixture();
        let handler = responder(&f, NoncePolicy::SingleUse);
        let good = f.tokens.create();

        let err = handler
            .request_solution(f.room.identity(), "short", good.as_str())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::NonceTooShort {
                role: NonceRole::Server,
                ..
            }
        ));

        let err = handler
            .request_solution(f.room.identity(), good.as_str(), "short")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::NonceTooShort {
                role: NonceRole::Client,
                ..
            }
        ));

        // Length checks fire before the nonce is consumed.
        assert!(f.tokens.has(good.as_str()));
    }

    #[tokio::test]
    async fn test_single_use_nonce_policy() {
        let f = fixture();
        let handler = responder(&f, NoncePolicy::SingleUse);
        let sc = Nonce::generate();
        let cc = f.tokens.create();
        let sid = f.room.identity();

        let first = handler.request_solution(sid, sc.as_str(), cc.as_str()).await;
        assert!(first.is_ok());
        assert_eq!(
            handler
                .request_solution(sid, sc.as_str(), cc.as_str())
                .await
                .unwrap_err(),
            HandshakeError::NonceUnknownOrExpired
        );
    }

    #[tokio::test]
    async fn test_reusable_nonce_policy() {
        let f = fixture();
        let handler = responder(&f, NoncePolicy::ReusableUntilExpiry);
        let sc = Nonce::generate();
        let cc = f.tokens.create();
        let sid = f.room.identity();

        let first = handler.request_solution(sid, sc.as_str(), cc.as_str()).await;
        let second = handler.request_solution(sid, sc.as_str(), cc.as_str()).await;
        assert!(first.is_ok());
        assert_eq!(first, second);
        assert!(f.tokens.has(cc.as_str()));
    }

    #[tokio::test]
    async fn test_send_solution_opens_session() {
        let f = fixture();
        let handler = handler(&f);
        let client = Keypair::generate();
        let sc = Nonce::generate();
        let cc = Nonce::generate();
        let sol = ProtocolVariant::Solution.solve(
            &client,
            handler.identity(),
            client.identity(),
            sc.as_str(),
            cc.as_str(),
        );

        let accepted = handler
            .send_solution(client.identity(), sc.as_str(), cc.as_str(), &sol)
            .await
            .unwrap();
        assert!(accepted);
        assert_eq!(f.sessions.sessions_of(client.identity()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_send_solution_rejects_forgery() {
        let f = fixture();
        let handler = handler(&f);
        let client = Keypair::generate();
        let mallory = Keypair::generate();
        let sc = Nonce::generate();
        let cc = Nonce::generate();

        // Mallory signs a body naming the client.
        let sol = ProtocolVariant::Solution.solve(
            &mallory,
            handler.identity(),
            client.identity(),
            sc.as_str(),
            cc.as_str(),
        );

        let err = handler
            .send_solution(client.identity(), sc.as_str(), cc.as_str(), &sol)
            .await
            .unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidSolution(_)));
        assert_eq!(f.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_all_solutions() {
        let f = fixture();
        let handler = handler(&f);
        let client = Identity::from_public_key([5; 32]);
        f.sessions.sign_in(&client, "sc", "cc").await.unwrap();

        assert!(handler.invalidate_all_solutions(&client).await.unwrap());
        assert_eq!(f.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_client_role_serves_only_request_solution() {
        let f = fixture();
        let responder = ServerHandshakeBuilder::new(f.keys.clone(), f.tokens.clone())
            .sessions(f.sessions.clone())
            .build_responder(Role::Client);
        let room = f.room.identity();
        let sc = Nonce::generate();
        let cc = f.tokens.create();

        let sol = responder
            .request_solution(room, sc.as_str(), cc.as_str())
            .await
            .unwrap();
        let cid = f.keys.identity();
        assert!(verify(cid, &sol, room, cid, sc.as_str(), cc.as_str()));

        // A valid solution from another peer still opens nothing here.
        let mallory = Keypair::generate();
        let forged = ProtocolVariant::Solution.solve(
            &mallory,
            cid,
            mallory.identity(),
            sc.as_str(),
            cc.as_str(),
        );
        let err = responder
            .send_solution(mallory.identity(), sc.as_str(), cc.as_str(), &forged)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HandshakeError::RoleNotSupported {
                operation: OP_SEND_SOLUTION,
                role: Role::Client,
            }
        );

        let err = responder
            .invalidate_all_solutions(mallory.identity())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "httpAuth.invalidateAllSolutions not supported on the client side"
        );
        assert_eq!(f.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_server_role_does_not_sign_for_callers() {
        let f = fixture();
        let responder = ServerHandshakeBuilder::new(f.keys.clone(), f.tokens.clone())
            .build_responder(Role::Server);
        let sc = Nonce::generate();
        let cc = f.tokens.create();

        let err = responder
            .request_solution(f.room.identity(), sc.as_str(), cc.as_str())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "httpAuth.requestSolution not supported on the server side"
        );
        assert!(f.tokens.has(cc.as_str()));
    }
}
