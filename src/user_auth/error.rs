use thiserror::Error;

use crate::interceptor::{AuthError, AuthErrorCode};

/// Outcome of a failed remote operation, one variant per status the
/// transport reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e.code {
            AuthErrorCode::Unauthenticated => ServiceError::Unauthenticated(e.message),
            AuthErrorCode::PermissionDenied => ServiceError::PermissionDenied(e.message),
            AuthErrorCode::MissingClaims => ServiceError::Internal(e.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_auth_error() {
        assert_eq!(
            ServiceError::from(AuthError::permission_denied()),
            ServiceError::PermissionDenied("insufficient permissions".to_string())
        );
        assert!(matches!(
            ServiceError::from(AuthError::unauthenticated("x")),
            ServiceError::Unauthenticated(_)
        ));
        assert!(matches!(
            ServiceError::from(AuthError::missing_claims()),
            ServiceError::Internal(_)
        ));
    }
}
