use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    TokenExpired,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token lifetime is out of range")]
    LifetimeOutOfRange,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::TokenExpired)
    }

    /// Short stable name, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::TokenExpired => "TOKEN_EXPIRED",
            TokenError::MalformedToken(_) => "MALFORMED_TOKEN",
            TokenError::UnsupportedAlgorithm(_) => "UNSUPPORTED_ALGORITHM",
            TokenError::LifetimeOutOfRange => "LIFETIME_OUT_OF_RANGE",
            TokenError::Signing(_) => "SIGNING_FAILED",
        }
    }
}
