//! Signed identity tokens.
//!
//! ## Components
//! - `claims`: `Role`, `Identity` and the `IdentityClaims` payload
//! - `codec`: `TokenCodec` (HS256 issue / validate)
//! - `error`: `TokenError`

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::{Identity, IdentityClaims, Role};
pub use codec::TokenCodec;
pub use error::TokenError;
