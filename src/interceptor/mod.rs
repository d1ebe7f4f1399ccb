//! Per-call authorization stage.
//!
//! Flow for one inbound call:
//!
//! ```text
//! full method name ──public?──yes──▶ handler(AuthContext::anonymous())
//!        │no
//!        ▼
//! metadata["authorization"] ──missing──▶ Unauthenticated
//!        │ strip "Bearer "
//!        ▼
//! TokenCodec::validate ──any error──▶ Unauthenticated
//!        │ claims
//!        ▼
//! handler(AuthContext { claims }) ──check_role──▶ PermissionDenied | pass
//! ```
//!
//! Public methods are matched on the full method name, never on a suffix
//! or substring.

pub mod error;

pub use error::{AuthError, AuthErrorCode};

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use crate::token::{IdentityClaims, Role, TokenCodec};

/// Service prefix shared by every remote operation.
pub const SERVICE_NAME: &str = "auth.AuthService";

/// Metadata key carrying the bearer token.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Exact, case-sensitive prefix in front of the token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Build `/auth.AuthService/<method>`.
pub fn full_method_name(method: &str) -> String {
    format!("/{}/{}", SERVICE_NAME, method)
}

/// Operations reachable without a token.
pub fn default_public_methods() -> HashSet<String> {
    ["Login", "CreateUser", "VerifyToken"]
        .into_iter()
        .map(full_method_name)
        .collect()
}

/// Inbound call metadata. Keys are case-insensitive and stored lower-cased;
/// a key may carry several values.
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    entries: HashMap<String, Vec<String>>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Verified identity attached to one call.
///
/// Set once by the interceptor; handlers only read it.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    claims: Option<Arc<IdentityClaims>>,
}

impl AuthContext {
    /// Context for a public call: no identity attached.
    pub fn anonymous() -> Self {
        Self { claims: None }
    }

    fn authenticated(claims: IdentityClaims) -> Self {
        Self {
            claims: Some(Arc::new(claims)),
        }
    }

    pub fn claims(&self) -> Option<&IdentityClaims> {
        self.claims.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }
}

/// Require exactly `required`. There is no hierarchy: an `Admin` token does
/// not satisfy a `User` requirement.
pub fn check_role(ctx: &AuthContext, required: Role) -> Result<&IdentityClaims, AuthError> {
    let claims = ctx.claims().ok_or_else(AuthError::missing_claims)?;
    if claims.role != required {
        tracing::warn!(
            user_id = claims.id,
            role = %claims.role,
            required = %required,
            "Role check failed"
        );
        return Err(AuthError::permission_denied());
    }
    Ok(claims)
}

/// Gates every remote operation behind token validation.
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    codec: Arc<TokenCodec>,
    public_methods: Arc<HashSet<String>>,
}

impl AuthInterceptor {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self::with_public_methods(codec, default_public_methods())
    }

    pub fn with_public_methods(codec: Arc<TokenCodec>, public_methods: HashSet<String>) -> Self {
        Self {
            codec,
            public_methods: Arc::new(public_methods),
        }
    }

    pub fn is_public(&self, full_method: &str) -> bool {
        self.public_methods.contains(full_method)
    }

    /// Decide whether a call may proceed and with which identity.
    ///
    /// `metadata` is `None` when the transport delivered no metadata at all.
    pub fn intercept(
        &self,
        full_method: &str,
        metadata: Option<&CallMetadata>,
    ) -> Result<AuthContext, AuthError> {
        if self.is_public(full_method) {
            return Ok(AuthContext::anonymous());
        }

        let metadata =
            metadata.ok_or_else(|| AuthError::unauthenticated("metadata is not provided"))?;

        let header = metadata.get(AUTHORIZATION_KEY).ok_or_else(|| {
            AuthError::unauthenticated("authorization token is not provided")
        })?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AuthError::unauthenticated("invalid token format"))?;

        match self.codec.validate(token) {
            Ok(claims) => {
                tracing::debug!(user_id = claims.id, method = full_method, "Token accepted");
                Ok(AuthContext::authenticated(claims))
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), method = full_method, "Token rejected");
                Err(AuthError::unauthenticated("invalid or expired token"))
            }
        }
    }

    /// Run `handler` behind [`intercept`](Self::intercept).
    pub async fn dispatch<F, Fut, T, E>(
        &self,
        full_method: &str,
        metadata: Option<&CallMetadata>,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce(AuthContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthError>,
    {
        let ctx = self.intercept(full_method, metadata)?;
        handler(ctx).await
    }
}
