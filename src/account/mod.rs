//! User account storage
//!
//! Records, validation and the storage seam the auth service depends on.

pub mod db;
pub mod models;
pub mod repository;
pub mod validation;

pub use db::{Database, PgUserRepository};
pub use models::{NewUser, User};
pub use repository::{InMemoryUserRepository, RepositoryError, UserRepository};
pub use validation::{Email, Username, ValidationError};
