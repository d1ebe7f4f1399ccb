//! Data models for user accounts

use crate::token::{Identity, Role};

/// Persisted user record.
///
/// `password_hash` is the encoded Argon2id string, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// The identity a token issued for this user carries.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// A user that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn with_id(self, id: i32) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            role: self.role,
        }
    }
}
