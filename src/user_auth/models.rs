//! Request and response bodies for the auth service operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User Login Request
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    #[serde(default)]
    pub username: String,
    #[schema(example = "secure_password123")]
    #[serde(default)]
    pub password: String,
}

/// Login Response (bearer token)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// User Registration Request
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "alice@example.com")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "alice")]
    #[serde(default)]
    pub username: String,
    #[schema(example = "secure_password123")]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub id: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct VerifyTokenResponse {
    pub username: String,
    pub id: i32,
    /// Role string projection ("User" or "Admin")
    #[schema(example = "Admin")]
    pub role: String,
}

/// Partial update; empty or absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub id: i32,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// "User" or "Admin"; any other value means User
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DeleteUserRequest {
    pub id: i32,
}
