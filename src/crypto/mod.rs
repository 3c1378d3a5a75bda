//! Crypto layer
//!
//! - [`Keypair`]: long-term ed25519 identity keys
//! - [`Nonce`]: 256-bit handshake nonces
//! - [`solve`] / [`verify`]: the canonical signed sign-in body

mod keys;
mod nonce;
mod solution;

pub use keys::Keypair;
pub use nonce::{Nonce, check_nonce_length};
pub use solution::{BodyFields, ProtocolVariant, Solution, canonical_body, solve, verify};
