//! Authentication middleware
//!
//! Bearer token gating for the /v1 routes

use crate::handlers::AppState;
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// Authentication middleware
///
/// Passes everything through when no `GATEWAY_API_TOKEN` is configured
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.security.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token);

    match provided {
        Some(token) if tokens_match(token, expected) => {
            debug!("Authentication successful");
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!("Invalid bearer token for {}", request.uri().path());
            Err(AppError::Authentication("invalid bearer token".to_string()))
        }
        None => {
            warn!("Missing bearer token for {}", request.uri().path());
            Err(AppError::Authentication("missing bearer token".to_string()))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// Comparison time does not depend on where the first mismatch is
fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123 "), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("secret-token", "secret-token"));
        assert!(!tokens_match("secret-tokem", "secret-token"));
        assert!(!tokens_match("secret", "secret-token"));
        assert!(!tokens_match("", "secret-token"));
        assert!(!tokens_match("secret-token-and-more", "secret-token"));
    }
}
