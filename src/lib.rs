//! Auth Service - credentials, bearer tokens and role-gated calls
//!
//! # Modules
//!
//! - [`password`] - Argon2id password hashing in the PHC-style string format
//! - [`token`] - HS256 identity tokens (`IdentityClaims`, `Role`)
//! - [`interceptor`] - per-call authentication and role checks
//! - [`clock`] - injectable time source for token expiry
//! - [`account`] - user records and storage (in-memory, PostgreSQL)
//! - [`user_auth`] - the `auth.AuthService` operations
//! - [`gateway`] - axum HTTP surface
//! - [`config`] / [`logging`] - process setup

pub mod clock;
pub mod config;
pub mod logging;

// Core auth components
pub mod interceptor;
pub mod password;
pub mod token;

// Service
pub mod account;
pub mod gateway;
pub mod user_auth;

// Convenient re-exports at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use interceptor::{AuthContext, AuthError, AuthInterceptor, check_role};
pub use password::{HashError, HashParams, hash_password, verify_password};
pub use token::{Identity, IdentityClaims, Role, TokenCodec, TokenError};
pub use user_auth::{ServiceError, UserAuthService};
