//! API key check for management endpoints.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::{GatewayError, Result};
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

fn provided_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
        })
}

/// Reject the request unless it carries the configured key. With no key
/// configured every request passes.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if let Some(expected) = state.api_key.as_deref() {
        if provided_key(request.headers()) != Some(expected) {
            warn!(path = %request.uri().path(), "Rejected request without a valid API key");
            return Err(GatewayError::InvalidApiKey);
        }
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_key_from_header_or_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(provided_key(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer k1"));
        assert_eq!(provided_key(&headers), Some("k1"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static(" k2 "));
        assert_eq!(provided_key(&headers), Some("k2"));
    }
}
