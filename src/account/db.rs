//! PostgreSQL user store

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use std::time::Duration;

use super::models::{NewUser, User};
use super::repository::{RepositoryError, UserRepository};
use crate::token::Role;

/// `users` table, created on startup if absent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(50) UNIQUE NOT NULL,
    password TEXT NOT NULL,
    email VARCHAR(255) UNIQUE NOT NULL,
    role VARCHAR(50) NOT NULL
)"#;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        tracing::info!("users table ready");
        Ok(())
    }
}

/// [`UserRepository`] over the `users` table. Roles are stored as their
/// string projection.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        email: row.try_get("email")?,
        role: Role::from_role_str(&role),
    })
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    let unique_violation =
        matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if unique_violation {
        RepositoryError::Conflict("username or email already taken".to_string())
    } else {
        RepositoryError::Database(e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<User, RepositoryError> {
        let row =
            sqlx::query(r#"SELECT id, username, password, email, role FROM users WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;
        Ok(user_from_row(&row)?)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT id, username, password, email, role FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(user_from_row(&row)?)
    }

    async fn exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let row =
            sqlx::query(r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS found"#)
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.try_get("found")?)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"INSERT INTO users (username, password, email, role)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        let id: i32 = row.try_get("id")?;
        Ok(user.with_id(id))
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE users
               SET username = $2, password = $3, email = $4, role = $5
               WHERE id = $1"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
