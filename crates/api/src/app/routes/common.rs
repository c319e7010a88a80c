//! Helpers shared by the protected routes.

use axum::http::{header, HeaderMap};
use axum::response::Response;

use userhub_auth::Permission;
use userhub_core::{AccountId, AuthError, ServiceError};

use crate::app::errors::error_response;
use crate::app::services::AppServices;

/// Pull the bearer token out of the `Authorization` header. A missing or
/// malformed header is indistinguishable from a bad token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Response> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| error_response(&ServiceError::Auth(AuthError::TokenInvalid)))
}

/// Authenticate the caller and require one named permission.
pub async fn require(
    services: &AppServices,
    headers: &HeaderMap,
    permission: &'static str,
) -> Result<AccountId, Response> {
    let token = bearer_token(headers)?;
    services
        .evaluator
        .check(token, &Permission::new(permission))
        .await
        .map_err(|e| error_response(&e))
}
