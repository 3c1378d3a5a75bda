//! Core types shared by both roles: constants, errors, identities,
//! addresses and the collaborator traits.

mod address;
mod constants;
mod error;
mod identity;
mod traits;

pub use address::*;
pub use constants::*;
pub use error::*;
pub use identity::*;
pub use traits::*;
