//! Anti-replay token store
//!
//! [`NonceCache`] is the only place client nonces are issued and the only
//! gate that says whether an inbound `cc` was issued here recently.

mod cache;

pub use cache::{NonceCache, NonceCacheConfig};
