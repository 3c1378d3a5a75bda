//! Collaborator traits.
//!
//! The handshake core does not dial peers, dispatch RPC, or store web
//! sessions itself. Hosts plug those in through the traits below.

use std::sync::Arc;

use async_trait::async_trait;

use super::address::{MultiserverAddress, PeerEntry};
use super::error::{HandshakeError, RemoteError};
use super::identity::Identity;
use crate::crypto::Solution;

/// Connectivity query: which peers are known and which are connected.
pub trait PeerDirectory: Send + Sync {
    /// Peers with a live connection.
    fn peers_connected(&self) -> Vec<PeerEntry>;

    /// Every peer this process knows how to dial.
    fn peers_all(&self) -> Vec<PeerEntry>;
}

/// Connection dispatch.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Establish or reuse a connection to `address`.
    ///
    /// `Ok(None)` means the dial completed without a usable peer (offline).
    async fn connect(
        &self,
        address: &MultiserverAddress,
    ) -> Result<Option<Arc<dyn RemotePeer>>, RemoteError>;
}

/// Handshake operations of a connected remote peer, as seen by the caller.
///
/// Errors carry only the short reason the remote chose to send.
#[async_trait]
pub trait RemotePeer: Send + Sync {
    /// Hand the remote a solution computed by us.
    async fn send_solution(&self, sc: &str, cc: &str, sol: &Solution)
    -> Result<bool, RemoteError>;

    /// Ask the remote to compute a solution.
    async fn request_solution(&self, sc: &str, cc: &str) -> Result<Solution, RemoteError>;

    /// Ask the remote to revoke every session derived from our solutions.
    async fn invalidate_all_solutions(&self) -> Result<bool, RemoteError>;
}

/// External session layer of the authenticating server.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a verified sign-in of `cid` for the nonce pair.
    ///
    /// Returns whether the web layer accepted the sign-in.
    async fn sign_in(&self, cid: &Identity, sc: &str, cc: &str) -> Result<bool, RemoteError>;

    /// Revoke every session of `cid`.
    async fn invalidate_all(&self, cid: &Identity) -> Result<(), RemoteError>;
}

/// The handshake RPC surface a peer serves.
///
/// Every operation receives the authenticated identity of the caller, as
/// established by the transport.
#[async_trait]
pub trait HandshakeResponder: Send + Sync {
    /// `sendSolution`: the caller proves control of its key.
    async fn send_solution(
        &self,
        caller: &Identity,
        sc: &str,
        cc: &str,
        sol: &Solution,
    ) -> Result<bool, HandshakeError>;

    /// `requestSolution`: the caller asks us to prove control of ours.
    async fn request_solution(
        &self,
        caller: &Identity,
        sc: &str,
        cc: &str,
    ) -> Result<Solution, HandshakeError>;

    /// `invalidateAllSolutions`: revoke the caller's sessions.
    async fn invalidate_all_solutions(&self, caller: &Identity) -> Result<bool, HandshakeError>;
}

/// A responder bound to one caller, usable as that caller's [`RemotePeer`].
///
/// This is the in-process dispatch path: errors are reduced to their short
/// reason before they reach the caller.
pub struct BoundResponder {
    responder: Arc<dyn HandshakeResponder>,
    caller: Identity,
}

impl BoundResponder {
    /// Bind `responder` to requests from `caller`.
    pub fn new(responder: Arc<dyn HandshakeResponder>, caller: Identity) -> Self {
        Self { responder, caller }
    }

    /// Identity the requests are attributed to.
    pub fn caller(&self) -> &Identity {
        &self.caller
    }
}

#[async_trait]
impl RemotePeer for BoundResponder {
    async fn send_solution(
        &self,
        sc: &str,
        cc: &str,
        sol: &Solution,
    ) -> Result<bool, RemoteError> {
        Ok(self
            .responder
            .send_solution(&self.caller, sc, cc, sol)
            .await?)
    }

    async fn request_solution(&self, sc: &str, cc: &str) -> Result<Solution, RemoteError> {
        Ok(self.responder.request_solution(&self.caller, sc, cc).await?)
    }

    async fn invalidate_all_solutions(&self) -> Result<bool, RemoteError> {
        Ok(self.responder.invalidate_all_solutions(&self.caller).await?)
    }
}
