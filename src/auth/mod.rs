//! Pre-shared-key authentication for the `/api` routes.
//!
//! Keys are compared in constant time.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppErrorWithState};
use crate::store::DashboardStore;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware: lets a request through when it presents the expected key.
///
/// With no key configured every request passes. Rejections carry the store's
/// current loading flag like every other envelope.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    store: Arc<DashboardStore>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let verdict = presented_key(request.headers()).map(|key| keys_match(key, &expected));
    let error = match verdict {
        Some(true) => return next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            AppError::Unauthorized("Invalid API key".to_string())
        }
        None => AppError::Unauthorized("Missing API key".to_string()),
    };
    AppErrorWithState::new(error, store.is_loading().await).into_response()
}

/// The key from `x-api-key`, or else from `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn keys_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
