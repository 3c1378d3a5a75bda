//! Client nonce cache.
//!
//! Issues client nonces (`cc`) and answers whether a nonce is still live.
//! Records are only removed by the periodic sweep, by [`NonceCache::take`], or
//! by [`NonceCache::shutdown`]; lookups never check age themselves.
//!
//! The sweep is a Tokio task owned by the cache. It starts with the first
//! record and stops itself once a sweep leaves the cache empty.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::core::{NONCE_EXPIRY, SWEEP_PERIOD};
use crate::crypto::Nonce;

/// Nonce cache timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceCacheConfig {
    /// Time between sweeps.
    pub sweep_period: Duration,

    /// Age after which a sweep removes a record.
    pub expiry: Duration,
}

impl Default for NonceCacheConfig {
    fn default() -> Self {
        Self {
            sweep_period: SWEEP_PERIOD,
            expiry: NONCE_EXPIRY,
        }
    }
}

#[derive(Default)]
struct CacheState {
    /// Token -> creation time.
    records: HashMap<String, Instant>,
    /// Running sweep task, if any.
    sweeper: Option<JoinHandle<()>>,
    /// Bumped for every spawned sweeper; a task only manages itself while
    /// its generation is current.
    generation: u64,
}

struct Inner {
    config: NonceCacheConfig,
    runtime: Handle,
    state: Mutex<CacheState>,
}

impl Inner {
    /// Remove expired records. Returns false when the sweeper should stop.
    fn sweep(&self, now: Instant, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        let expiry = self.config.expiry;
        let before = state.records.len();
        state
            .records
            .retain(|_, created| now.saturating_duration_since(*created) <= expiry);
        let removed = before - state.records.len();
        if removed > 0 {
            debug!(removed, remaining = state.records.len(), "swept expired client nonces");
        }

        if state.records.is_empty() {
            state.sweeper = None;
            return false;
        }
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(sweeper) = self.state.get_mut().sweeper.take() {
            sweeper.abort();
        }
    }
}

async fn run_sweeper(inner: Weak<Inner>, generation: u64, start: Instant, period: Duration) {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if !inner.sweep(Instant::now(), generation) {
            debug!("nonce cache empty, sweeper stopped");
            return;
        }
    }
}

/// In-memory cache of live client nonces.
///
/// Cheap to clone; clones share the same records.
#[derive(Clone)]
pub struct NonceCache {
    inner: Arc<Inner>,
}

impl NonceCache {
    /// Create a cache whose sweeper runs on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(config: NonceCacheConfig) -> Self {
        Self::with_runtime(config, Handle::current())
    }

    /// Create a cache whose sweeper runs on `runtime`.
    pub fn with_runtime(config: NonceCacheConfig, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                runtime,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Issue a fresh nonce and record it as live.
    pub fn create(&self) -> Nonce {
        let nonce = Nonce::generate();
        let now = Instant::now();

        let mut state = self.inner.state.lock();
        state.records.insert(nonce.as_str().to_owned(), now);
        if state.sweeper.is_none() {
            let period = self.inner.config.sweep_period;
            state.generation += 1;
            let weak = Arc::downgrade(&self.inner);
            let task = run_sweeper(weak, state.generation, now + period, period);
            state.sweeper = Some(self.inner.runtime.spawn(task));
        }
        nonce
    }

    /// True while `token` is recorded, whatever its age.
    pub fn has(&self, token: &str) -> bool {
        self.inner.state.lock().records.contains_key(token)
    }

    /// Remove `token`, returning whether it was recorded.
    pub fn take(&self, token: &str) -> bool {
        self.inner.state.lock().records.remove(token).is_some()
    }

    /// Stop the sweeper and drop every record.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        state.records.clear();
        if let Some(sweeper) = state.sweeper.take() {
            sweeper.abort();
        }
    }

    /// Number of recorded nonces.
    pub fn len(&self) -> usize {
        self.inner.state.lock().records.len()
    }

    /// True when no nonce is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while the sweeper task is scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.inner.state.lock().sweeper.is_some()
    }

    /// Cache timing.
    pub fn config(&self) -> &NonceCacheConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for NonceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceCache")
            .field("config", &self.inner.config)
            .field("len", &self.len())
            .finish()
    }
}
