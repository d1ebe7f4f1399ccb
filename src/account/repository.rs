//! User storage seam
//!
//! The auth service only talks to storage through [`UserRepository`].
//! [`InMemoryUserRepository`] backs tests and database-less runs; the
//! Postgres implementation lives in `account::db`.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use thiserror::Error;

use super::models::{NewUser, User};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("user not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<User, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError>;

    async fn exists(&self, username: &str) -> Result<bool, RepositoryError>;

    /// Insert a user; username and email must be unique.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Overwrite every column of the row with `user.id`.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
}

/// Process-local user table.
pub struct InMemoryUserRepository {
    users: DashMap<i32, User>,
    next_id: AtomicI32,
    /// Serializes writers so uniqueness checks and inserts are atomic.
    write_lock: Mutex<()>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI32::new(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn check_unique(
        &self,
        username: &str,
        email: &str,
        skip_id: Option<i32>,
    ) -> Result<(), RepositoryError> {
        for entry in self.users.iter() {
            let other = entry.value();
            if Some(other.id) == skip_id {
                continue;
            }
            if other.username == username {
                return Err(RepositoryError::Conflict(format!(
                    "username '{}' already taken",
                    username
                )));
            }
            if other.email == email {
                return Err(RepositoryError::Conflict(format!(
                    "email '{}' already taken",
                    email
                )));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<User, RepositoryError> {
        self.users
            .get(&id)
            .map(|u| u.value().clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        self.users
            .iter()
            .find(|u| u.value().username == username)
            .map(|u| u.value().clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn exists(&self, username: &str) -> Result<bool, RepositoryError> {
        Ok(self.users.iter().any(|u| u.value().username == username))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.check_unique(&user.username, &user.email, None)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = user.with_id(id);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        self.check_unique(&user.username, &user.email, Some(user.id))?;
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
