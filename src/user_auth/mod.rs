//! The `auth.AuthService` operations.
//!
//! Transport-neutral: handlers receive the [`AuthContext`](crate::interceptor::AuthContext)
//! produced by the interceptor and return [`ServiceError`] which each
//! transport maps onto its own status codes.

pub mod error;
pub mod models;
pub mod service;

pub use error::ServiceError;
pub use models::*;
pub use service::UserAuthService;
