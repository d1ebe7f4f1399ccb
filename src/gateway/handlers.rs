//! HTTP handlers, one per `auth.AuthService` operation.
//!
//! Paths are the full method names; the body is the request message as
//! JSON.

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa::ToSchema;

use super::state::AppState;
use super::types::ApiResponse;
use crate::interceptor::AuthContext;
use crate::user_auth::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, LoginRequest, LoginResponse,
    ServiceError, UpdateUserRequest, VerifyTokenRequest, VerifyTokenResponse,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

#[utoipa::path(
    post,
    path = "/auth.AuthService/Login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Missing username or password"),
        (status = 403, description = "Wrong password"),
        (status = 404, description = "Unknown username")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let resp = state.auth.login(req).await?;
    Ok(Json(ApiResponse::success(resp)))
}

#[utoipa::path(
    post,
    path = "/auth.AuthService/CreateUser",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<CreateUserResponse>),
        (status = 400, description = "Missing field or invalid email"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "Auth"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<CreateUserResponse> {
    let resp = state.auth.create_user(req).await?;
    Ok(Json(ApiResponse::success(resp)))
}

#[utoipa::path(
    post,
    path = "/auth.AuthService/VerifyToken",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token identity", body = ApiResponse<VerifyTokenResponse>),
        (status = 400, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    tag = "Auth"
)]
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyTokenRequest>,
) -> ApiResult<VerifyTokenResponse> {
    let resp = state.auth.verify_token(req)?;
    Ok(Json(ApiResponse::success(resp)))
}

#[utoipa::path(
    post,
    path = "/auth.AuthService/UpdateUser",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Invalid id or nothing to change"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<()> {
    state.auth.update_user(&ctx, req).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/auth.AuthService/DeleteUser",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<DeleteUserRequest>,
) -> ApiResult<()> {
    state.auth.delete_user(&ctx, req).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Health check response data
#[derive(serde::Serialize, serde::Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

/// Liveness plus a database ping when Postgres is configured.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let healthy = match &state.pg_db {
        Some(db) => match db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("[HEALTH] Postgres ping failed: {}", e);
                false
            }
        },
        None => true,
    };

    if !healthy {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: super::types::error_codes::SERVICE_UNAVAILABLE,
                msg: "unavailable".to_string(),
                data: None,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        })),
    )
}
