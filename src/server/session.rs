//! In-memory session store.
//!
//! Stands in for the web layer's session collaborator when the host has
//! none of its own, and backs the tests. Each verified sign-in opens one
//! session keyed by a random id; invalidation drops every session of a
//! client.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use rand::{RngCore, rngs::OsRng};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::core::{Identity, RemoteError, SessionStore};

/// Session ID - 128-bit random identifier handed to the web layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WebSessionId([u8; 16]);

impl WebSessionId {
    /// Generate a random session ID.
    pub fn generate() -> Self {
        let mut id = [0u8; 16];
        OsRng.fill_bytes(&mut id);
        Self(id)
    }

    /// Get the session ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for WebSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for WebSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebSessionId({self})")
    }
}

/// One signed-in session.
#[derive(Debug, Clone)]
pub struct WebSession {
    /// Session ID.
    pub id: WebSessionId,

    /// Server nonce the sign-in answered.
    pub sc: String,

    /// Client nonce the sign-in used.
    pub cc: String,

    /// Sign-in time.
    pub created_at: Instant,
}

/// Session store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Identity, Vec<WebSession>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions currently open for `cid`.
    pub async fn sessions_of(&self, cid: &Identity) -> Vec<WebSession> {
        self.sessions
            .read()
            .await
            .get(cid)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn sign_in(&self, cid: &Identity, sc: &str, cc: &str) -> Result<bool, RemoteError> {
        let session = WebSession {
            id: WebSessionId::generate(),
            sc: sc.to_owned(),
            cc: cc.to_owned(),
            created_at: Instant::now(),
        };
        debug!(%cid, session = %session.id, "opened web session");
        self.sessions
            .write()
            .await
            .entry(cid.clone())
            .or_default()
            .push(session);
        Ok(true)
    }

    async fn invalidate_all(&self, cid: &Identity) -> Result<(), RemoteError> {
        let removed = self
            .sessions
            .write()
            .await
            .remove(cid)
            .map_or(0, |sessions| sessions.len());
        debug!(%cid, removed, "invalidated web sessions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generate() {
        let id1 = WebSessionId::generate();
        let id2 = WebSessionId::generate();

        // IDs should be different (with very high probability)
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_display() {
        let id = WebSessionId([0xab; 16]);
        let display = format!("{}", id);
        assert_eq!(display.len(), 32); // 128 bits = 32 hex chars
        assert_eq!(display, hex::encode([0xab; 16]));
    }

    #[tokio::test]
    async fn test_sign_in_and_invalidate() {
        let store = MemorySessionStore::new();
        let alice = Identity::from_public_key([1; 32]);
        let bob = Identity::from_public_key([2; 32]);

        assert!(store.sign_in(&alice, "sc1", "cc1").await.unwrap());
        assert!(store.sign_in(&alice, "sc2", "cc2").await.unwrap());
        assert!(store.sign_in(&bob, "sc3", "cc3").await.unwrap());
        assert_eq!(store.session_count().await, 3);

        store.invalidate_all(&alice).await.unwrap();
        assert!(store.sessions_of(&alice).await.is_empty());
        assert_eq!(store.sessions_of(&bob).await.len(), 1);
    }
}
