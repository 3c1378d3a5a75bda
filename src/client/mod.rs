//! Client side of the handshake.
//!
//! [`HttpAuthClient`] drives both sign-in flows and sign-out; [`SignInUri`]
//! and [`sign_in_web_url`] handle the web hand-off formats.

#[allow(clippy::module_inception)]
mod client;
mod uri;

pub use client::*;
pub use uri::*;
