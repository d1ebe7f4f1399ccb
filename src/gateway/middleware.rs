use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::state::AppState;
use crate::interceptor::{AuthError, CallMetadata};

/// Request headers as call metadata. Values that are not visible ASCII are
/// dropped.
pub fn metadata_from_headers(headers: &HeaderMap) -> CallMetadata {
    let mut metadata = CallMetadata::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            metadata.insert(name.as_str(), value);
        }
    }
    metadata
}

/// Runs the interceptor for the request path (the full method name) and
/// hands the resulting `AuthContext` to the handler via extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let metadata = metadata_from_headers(request.headers());
    let ctx = state
        .interceptor
        .intercept(request.uri().path(), Some(&metadata))?;

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("x-bin", HeaderValue::from_bytes(b"\xff\xfe").unwrap());

        let md = metadata_from_headers(&headers);
        assert_eq!(md.get("authorization"), Some("Bearer abc"));
        assert_eq!(md.get("AUTHORIZATION"), Some("Bearer abc"));
        assert_eq!(md.get("x-bin"), None);
    }
}
