//! HS256 token issuance and validation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use std::sync::Arc;

use super::claims::{Identity, IdentityClaims};
use super::error::TokenError;
use crate::clock::{Clock, SystemClock};

/// Header `alg` values accepted by [`TokenCodec::validate`].
const ALLOWED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Signs and verifies identity tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Issue a token for `identity` that expires `ttl` from now.
    ///
    /// A negative `ttl` yields an already-expired token. A `ttl` that pushes
    /// the expiry past the representable date range is rejected.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::LifetimeOutOfRange)?;
        let claims = IdentityClaims {
            sub: identity.username.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            username: identity.username.clone(),
            id: identity.id,
            role: identity.role,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Validate a token and return its claims.
    ///
    /// Order of checks: structure, header algorithm allow-list, signature,
    /// expiry. A header naming anything outside the HMAC family is rejected
    /// before the signature is looked at.
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        let header_alg = read_header_alg(token)?;
        if !ALLOWED_ALGORITHMS
            .iter()
            .any(|alg| algorithm_name(*alg) == header_alg)
        {
            return Err(TokenError::UnsupportedAlgorithm(header_alg));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<IdentityClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnsupportedAlgorithm("key family mismatch".to_string())
                }
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::MalformedToken(e.to_string()),
            },
        )?;

        // Valid only while strictly before `exp`.
        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenError::TokenExpired);
        }

        Ok(data.claims)
    }
}

/// Decode the header segment far enough to read `alg`.
fn read_header_alg(token: &str) -> Result<String, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::MalformedToken(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|e| TokenError::MalformedToken(format!("header encoding: {}", e)))?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::MalformedToken(format!("header json: {}", e)))?;

    match header.get("alg").and_then(|v| v.as_str()) {
        Some(alg) => Ok(alg.to_string()),
        None => Err(TokenError::UnsupportedAlgorithm("<absent>".to_string())),
    }
}

fn algorithm_name(alg: Algorithm) -> &'static str {
    match alg {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::token::Role;

    const SECRET: &[u8] = b"test-secret-for-unit-tests";

    fn alice() -> Identity {
        Identity {
            id: 5,
            username: "alice".to_string(),
            role: Role::Admin,
        }
    }

    fn replace_header(token: &str, header_json: &str) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[0] = URL_SAFE_NO_PAD.encode(header_json);
        parts.join(".")
    }

    #[test]
    fn test_issue_validate_roundtrip() {
        let codec = TokenCodec::new(SECRET);
        for identity in [
            alice(),
            Identity {
                id: 1,
                username: "bob".to_string(),
                role: Role::User,
            },
        ] {
            let token = codec.issue(&identity, Duration::minutes(5)).unwrap();
            assert_eq!(token.split('.').count(), 3);
            let claims = codec.validate(&token).unwrap();
            assert_eq!(claims.identity(), identity);
            assert_eq!(claims.sub, identity.username);
            assert!(claims.exp > claims.iat);
        }
    }

    #[test]
    fn test_scenario_expiry_with_clock_advance() {
        let clock = Arc::new(ManualClock::default());
        let codec = TokenCodec::with_clock(SECRET, clock.clone());

        let token = codec.issue(&alice(), Duration::minutes(5)).unwrap();
        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.id, 5);
        assert_eq!(claims.role, Role::Admin);

        clock.advance(Duration::minutes(6));
        let err = codec.validate(&token).unwrap_err();
        assert!(err.is_expired(), "got {err}");
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let clock = Arc::new(ManualClock::default());
        let codec = TokenCodec::with_clock(SECRET, clock);
        let token = codec.issue(&alice(), Duration::zero()).unwrap();
        assert!(matches!(
            codec.validate(&token).unwrap_err(),
            TokenError::TokenExpired
        ));
    }

    #[test]
    fn test_expiry_boundary_second() {
        let start = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let codec = TokenCodec::with_clock(SECRET, clock.clone());
        let token = codec.issue(&alice(), Duration::seconds(10)).unwrap();

        clock.advance(Duration::seconds(9));
        assert!(codec.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(codec.validate(&token).unwrap_err().is_expired());
    }

    #[test]
    fn test_huge_ttl_rejected_without_panic() {
        let codec = TokenCodec::new(SECRET);
        let err = codec
            .issue(&alice(), Duration::days(365 * 300_000))
            .unwrap_err();
        assert!(matches!(err, TokenError::LifetimeOutOfRange));
        assert_eq!(err.kind(), "LIFETIME_OUT_OF_RANGE");
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&alice(), Duration::seconds(-1)).unwrap();
        assert!(matches!(
            codec.validate(&token).unwrap_err(),
            TokenError::TokenExpired
        ));
    }

    #[test]
    fn test_other_secret_fails_signature() {
        let issuer = TokenCodec::new(b"some-other-secret");
        let verifier = TokenCodec::new(SECRET);
        let token = issuer.issue(&alice(), Duration::minutes(5)).unwrap();
        assert!(matches!(
            verifier.validate(&token).unwrap_err(),
            TokenError::InvalidSignature
        ));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&alice(), Duration::minutes(5)).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = serde_json::json!({
            "sub": "alice", "exp": i64::MAX / 2, "iat": 0, "Username": "alice", "ID": 1, "Role": "Admin"
        });
        parts[1] = URL_SAFE_NO_PAD.encode(forged.to_string());
        let forged_token = parts.join(".");
        assert!(matches!(
            codec.validate(&forged_token).unwrap_err(),
            TokenError::InvalidSignature
        ));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&alice(), Duration::minutes(5)).unwrap();
        let forged = replace_header(&token, r#"{"alg":"none","typ":"JWT"}"#);
        match codec.validate(&forged).unwrap_err() {
            TokenError::UnsupportedAlgorithm(alg) => assert_eq!(alg, "none"),
            other => panic!("unexpected error: {other}"),
        }

        // Unsigned form with an empty signature segment.
        let mut parts: Vec<&str> = forged.split('.').collect();
        parts[2] = "";
        let unsigned = parts.join(".");
        assert!(matches!(
            codec.validate(&unsigned).unwrap_err(),
            TokenError::UnsupportedAlgorithm(_)
        ));
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&alice(), Duration::minutes(5)).unwrap();
        for header in [
            r#"{"alg":"RS256","typ":"JWT"}"#,
            r#"{"alg":"ES256","typ":"JWT"}"#,
            r#"{"alg":"hs256","typ":"JWT"}"#,
            r#"{"typ":"JWT"}"#,
        ] {
            let forged = replace_header(&token, header);
            assert!(
                matches!(
                    codec.validate(&forged).unwrap_err(),
                    TokenError::UnsupportedAlgorithm(_)
                ),
                "{header}"
            );
        }
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new(SECRET);
        for bad in ["", "abc", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert!(
                matches!(
                    codec.validate(bad).unwrap_err(),
                    TokenError::MalformedToken(_)
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_unknown_role_claim_demotes_to_user() {
        let codec = TokenCodec::new(SECRET);
        let exp = chrono::Utc::now().timestamp() + 300;
        let payload = serde_json::json!({
            "sub": "carol", "exp": exp, "iat": 0, "Username": "carol", "ID": 9, "Role": "Owner"
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.id, 9);
    }

    #[test]
    fn test_hs512_token_accepted() {
        let codec = TokenCodec::new(SECRET);
        let exp = chrono::Utc::now().timestamp() + 300;
        let payload = serde_json::json!({
            "sub": "dave", "exp": exp, "Username": "dave", "ID": 3, "Role": "User"
        });
        let token = encode(
            &Header::new(Algorithm::HS512),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(codec.validate(&token).unwrap().username, "dave");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let codec = TokenCodec::new(SECRET);
        let debug = format!("{:?}", codec);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("test-secret"));
    }
}
