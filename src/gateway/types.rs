//! API response envelope and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - `ServiceError` rendering for axum handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::user_auth::ServiceError;

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success, absent on error
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;

    // Auth errors (2xxx)
    pub const UNAUTHENTICATED: i32 = 2001;
    pub const PERMISSION_DENIED: i32 = 2002;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;
    pub const ALREADY_EXISTS: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

impl ServiceError {
    pub fn status(&self) -> (StatusCode, i32) {
        match self {
            Self::InvalidArgument(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            Self::AlreadyExists(_) => (StatusCode::CONFLICT, error_codes::ALREADY_EXISTS),
            Self::PermissionDenied(_) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            Self::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, error_codes::UNAUTHENTICATED),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m)
            | Self::NotFound(m)
            | Self::AlreadyExists(m)
            | Self::PermissionDenied(m)
            | Self::Unauthenticated(m)
            | Self::Internal(m) => m,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        (status, Json(ApiResponse::<()>::error(code, self.message()))).into_response()
    }
}
