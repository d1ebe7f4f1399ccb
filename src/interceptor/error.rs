//! Call-level authorization errors.
//!
//! Every token or role failure collapses into one of these codes so that
//! callers never learn which cryptographic check failed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Authorization error codes (4001-4003).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 4001: Identity could not be established
    Unauthenticated = 4001,
    /// 4002: Identity established, role insufficient
    PermissionDenied = 4002,
    /// 4003: Handler ran without claims in its context
    MissingClaims = 4003,
}

impl AuthErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::MissingClaims => "MISSING_CLAIMS",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::MissingClaims => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", .code.name())]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::Unauthenticated, message)
    }

    pub fn permission_denied() -> Self {
        Self::new(AuthErrorCode::PermissionDenied, "insufficient permissions")
    }

    pub fn missing_claims() -> Self {
        Self::new(
            AuthErrorCode::MissingClaims,
            "user claims not found in context",
        )
    }
}

/// JSON response body for auth errors, shaped like the gateway envelope.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub code: i32,
    pub msg: String,
    pub error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            code: self.code.code(),
            msg: self.message,
            error: self.code.name(),
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}
