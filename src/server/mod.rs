//! Responder side of the handshake.
//!
//! The RPC surface a peer serves to remote callers, selected by [`Role`](crate::core::Role).

mod handler;
mod session;

pub use handler::*;
pub use session::*;
